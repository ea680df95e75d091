//! Option resolution shared by all commands.
//!
//! Precedence: command-line flag, then environment variable (both handled by
//! clap), then `config.toml`, then built-in default.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use plugwatch_core::{
    Classifier, Config, ConfigError, Credentials, CoreError, Region, SqliteEventStore, TuyaClient,
};

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Tuya device ID
    #[arg(long, env = "TUYA_DEVICE_ID", global = true)]
    pub api_device_id: Option<String>,
    /// Tuya API region (us, us-e, eu, eu-w, cn, in)
    #[arg(long, env = "TUYA_API_REGION", global = true)]
    pub api_region: Option<String>,
    /// Tuya API key (access id)
    #[arg(long, env = "TUYA_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,
    /// Tuya API secret
    #[arg(long, env = "TUYA_API_SECRET", global = true, hide_env_values = true)]
    pub api_secret: Option<String>,
    /// History database path
    #[arg(long, env = "PLUGWATCH_DB", global = true)]
    pub db: Option<PathBuf>,
    /// Config file path
    #[arg(long, env = "PLUGWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,
    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

pub struct Context {
    pub args: GlobalArgs,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Context {
    pub fn load(args: GlobalArgs) -> Result<Self, ConfigError> {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => Config::default_path(),
        };
        let config = Config::load_from(&config_path)?;
        config.validate()?;
        Ok(Self {
            args,
            config,
            config_path,
        })
    }

    pub fn store(&self) -> Result<SqliteEventStore, CoreError> {
        let path = match &self.args.db {
            Some(path) => path.clone(),
            None => self.config.database_path()?,
        };
        tracing::debug!(path = %path.display(), "opening history database");
        Ok(SqliteEventStore::open(path)?)
    }

    pub fn classifier(&self, threshold: Option<f64>) -> Result<Classifier, CoreError> {
        let watts = threshold.unwrap_or(self.config.threshold_watts);
        Ok(Classifier::new(watts)?)
    }

    pub fn client(&self) -> Result<TuyaClient, CoreError> {
        let device_id = self
            .args
            .api_device_id
            .clone()
            .or_else(|| self.config.tuya.device_id.clone())
            .ok_or_else(|| ConfigError::MissingKey("device id (--api-device-id or TUYA_DEVICE_ID)".into()))?;
        let region: Region = self
            .args
            .api_region
            .as_deref()
            .or(self.config.tuya.region.as_deref())
            .ok_or_else(|| ConfigError::MissingKey("region (--api-region or TUYA_API_REGION)".into()))?
            .parse()?;
        let credentials = Credentials::resolve(self.args.api_key.clone(), self.args.api_secret.clone())?;

        TuyaClient::new(
            region,
            device_id,
            credentials,
            Duration::from_secs(self.config.tuya.timeout_secs),
        )
    }
}

/// Run one future to completion on a fresh single-threaded runtime.
pub fn block_on<F: Future>(fut: F) -> Result<F::Output, std::io::Error> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(rt.block_on(fut))
}
