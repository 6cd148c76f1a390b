//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Konfiguration):
//! - `CC_LOG_LEVEL`: Filter im EnvFilter-Format, z.B. `debug` oder
//!   `info,callcenter_router=trace`. Standard: info
//! - `CC_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Verbindungs-IDs werden als Tracing-Span-Felder propagiert.

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{fmt, EnvFilter};

/// Umgebungsvariable fuer den Log-Filter
pub const ENV_LOG_LEVEL: &str = "CC_LOG_LEVEL";

/// Umgebungsvariable fuer das Log-Format
pub const ENV_LOG_FORMAT: &str = "CC_LOG_FORMAT";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unbekanntes Log-Format: {0} (erlaubt: text, json)")]
    UnbekanntesFormat(String),

    #[error("Logging bereits initialisiert: {0}")]
    BereitsInitialisiert(String),
}

/// Ausgabeformat der Logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            andere => Err(LoggingError::UnbekanntesFormat(andere.to_string())),
        }
    }
}

/// Wohin die Logs geschrieben werden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogZiel {
    Stdout,
    Stderr,
}

/// Initialisiert das Logging-System.
///
/// `CC_LOG_LEVEL` und `CC_LOG_FORMAT` ueberschreiben `level` und `format`.
/// Ein ungueltiger Filter faellt auf `info` zurueck, ein ungueltiges Format
/// ist ein Fehler.
pub fn logging_initialisieren(level: &str, format: &str, ziel: LogZiel) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format: LogFormat = std::env::var(ENV_LOG_FORMAT)
        .unwrap_or_else(|_| format.to_string())
        .parse()?;

    let ergebnis = match (format, ziel) {
        (LogFormat::Json, LogZiel::Stdout) => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .try_init(),
        (LogFormat::Json, LogZiel::Stderr) => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .try_init(),
        (LogFormat::Text, LogZiel::Stdout) => {
            fmt().with_env_filter(filter).with_target(true).try_init()
        }
        (LogFormat::Text, LogZiel::Stderr) => fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    ergebnis.map_err(|e| LoggingError::BereitsInitialisiert(e.to_string()))
}
