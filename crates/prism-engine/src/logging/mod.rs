//! Logging utilities.
//!
//! Centralizes logger initialization. Engine code logs through the `log` facade
//! only; `env_logger` is wired here and nowhere else.

mod init;

pub use init::{init_logging, LoggingConfig};
