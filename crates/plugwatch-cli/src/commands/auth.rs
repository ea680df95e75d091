use clap::Subcommand;
use plugwatch_core::{ConfigError, Credentials};

use crate::context::Context;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store --api-key and --api-secret (or TUYA_API_KEY/TUYA_API_SECRET) in the OS keyring
    Set,
    /// Remove stored credentials
    Clear,
}

pub fn run(ctx: &Context, action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Set => {
            let (Some(api_key), Some(api_secret)) =
                (ctx.args.api_key.clone(), ctx.args.api_secret.clone())
            else {
                return Err(ConfigError::MissingKey("--api-key and --api-secret".into()).into());
            };
            Credentials { api_key, api_secret }.store()?;
            println!("credentials stored");
        }
        AuthAction::Clear => {
            Credentials::clear()?;
            println!("credentials removed");
        }
    }
    Ok(())
}
