//! callcenter-core – Gemeinsame Typen, Ereignisse und Fehlertypen
//!
//! Dieses Crate stellt die Bausteine bereit, die vom Router, vom Protokoll
//! und vom Server gemeinsam genutzt werden.

pub mod command;
pub mod error;
pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use command::Command;
pub use error::{CallCenterError, Result};
pub use event::{render_events, RouterEvent};
pub use types::{CallId, OperatorId, OperatorState};
