//! # callcenter-observability
//!
//! Structured Logging via tracing-subscriber (Text oder JSON).
//!
//! Der Server loggt nach stdout, Shell und Client nach stderr, damit Logs
//! nicht in die Prompt-Ausgabe geraten.

pub mod logging;

pub use logging::{logging_initialisieren, LogFormat, LogZiel, LoggingError};
