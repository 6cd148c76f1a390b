//! callcenter-protocol – Befehlszeilen und Netzwerk-Envelopes
//!
//! - `text`: Shell-Syntax `call <id>`, `answer <id>`, ... und Hilfetexte
//! - `envelope`: JSON-Request/Response (`{"command":..,"id":..}` / `{"response":..}`)
//! - `wire`: zeilenbasierter tokio-util Codec fuer die Envelopes

pub mod envelope;
pub mod error;
pub mod text;
pub mod wire;

pub use envelope::{request_parsen, Request, Response};
pub use error::{ProtokollError, ProtokollResult};
pub use text::{command_parsen, zeile_zerlegen};
pub use wire::EnvelopeCodec;
