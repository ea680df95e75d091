use clap::Subcommand;
use plugwatch_core::Config;

use crate::context::Context;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "threshold_watts", "tuya.region")
        key: String,
    },
    /// Set a config value (empty string clears optional keys)
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(ctx: &Context, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => match ctx.config.get(&key) {
            Some(value) => println!("{value}"),
            None => return Err(format!("unknown key: {key}").into()),
        },
        ConfigAction::Set { key, value } => {
            let mut config = ctx.config.clone();
            config.set(&key, &value)?;
            config.save_to(&ctx.config_path)?;
            println!("ok");
        }
        ConfigAction::List => {
            println!("{}", serde_json::to_string_pretty(&ctx.config)?);
        }
        ConfigAction::Reset => {
            Config::default().save_to(&ctx.config_path)?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
