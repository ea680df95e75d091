pub mod auth;
pub mod config;
pub mod history;
pub mod info;
pub mod log;
pub mod record;
pub mod status;
