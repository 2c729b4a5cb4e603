//! # AFE Utilities
//!
//! Shared helpers for the AFE tools.
//!
//! Currently this is the logging setup built on `tracing`, used by the `afe`
//! binary and available to anything else embedding `afe-core`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{
    init_logging, init_logging_with_format, init_logging_with_level, LogFormat, LogLevel, LoggingError, LoggingGuard,
};
pub use tracing::{debug, error, info, trace, warn};
