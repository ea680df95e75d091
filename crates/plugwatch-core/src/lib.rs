//! # plugwatch Core Library
//!
//! Status history engine for a Tuya smart plug. A cron job polls the plug,
//! the recorder turns each poll into at most one new event, and the history
//! module compresses the event log into contiguous On/Off ranges.
//!
//! ## Key Components
//!
//! - [`Classifier`]: threshold-based On/Off classification of a [`Reading`]
//! - [`Recorder`]: deduplicating writer for the event log
//! - [`aggregate`]: event log to [`StatusRange`] compression
//! - [`SqliteEventStore`]: persistent [`EventStore`]
//! - [`TuyaClient`]: signed Tuya OpenAPI client, the production [`SampleSource`]
//! - [`Config`]: TOML configuration

pub mod credentials;
pub mod error;
pub mod events;
pub mod history;
pub mod reading;
pub mod recorder;
pub mod status;
pub mod storage;
pub mod tuya;

pub use credentials::Credentials;
pub use error::{ApiError, ConfigError, CoreError, InvalidReading, StoreError};
pub use events::{Event, EventStore, MemoryEventStore};
pub use history::{aggregate, read_all, Ranges, StatusRange};
pub use reading::{DataPoint, PlugSnapshot, Reading};
pub use recorder::{record_from, RecordOutcome, Recorder, SampleSource, SkipReason};
pub use status::{Classifier, Status, DEFAULT_THRESHOLD_WATTS};
pub use storage::{Config, SqliteEventStore, TuyaConfig};
pub use tuya::{DeviceInfo, Region, TuyaClient};
