//! JSON-Envelopes des Netzwerkprotokolls
//!
//! Eine Zeile pro Nachricht:
//!
//! ```text
//! -> {"command": "call", "id": "1"}
//! <- {"response": "Call 1 received\nCall 1 ringing for operator A\n"}
//! <- {"error": "Unbekannter Befehl: dial"}
//! ```
//!
//! Numerische IDs (`{"command":"call","id":1}`) werden als Text uebernommen.

use callcenter_core::{render_events, Command, RouterEvent};
use serde::{Deserialize, Serialize};

use crate::error::{ProtokollError, ProtokollResult};
use crate::text::command_parsen;

/// Request vom Client an den Server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub command: String,
    pub id: String,
}

impl From<&Command> for Request {
    fn from(command: &Command) -> Self {
        Self {
            command: command.name().to_string(),
            id: command.id().to_string(),
        }
    }
}

/// Eingangsform mit optionalen Feldern fuer genaue Fehlermeldungen
#[derive(Debug, Deserialize)]
struct RohRequest {
    command: Option<String>,
    id: Option<serde_json::Value>,
}

/// Parst eine Request-Zeile direkt in einen Router-Befehl
pub fn request_parsen(zeile: impl AsRef<[u8]>) -> ProtokollResult<Command> {
    let roh: RohRequest = serde_json::from_slice(zeile.as_ref())
        .map_err(|e| ProtokollError::UngueltigesRequest(e.to_string()))?;

    let name = roh
        .command
        .ok_or_else(|| ProtokollError::UngueltigesRequest("Feld 'command' fehlt".into()))?;

    let id = match roh.id {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(andere) => {
            return Err(ProtokollError::UngueltigesRequest(format!(
                "Feld 'id' muss Text oder Zahl sein, nicht {andere}"
            )))
        }
    };

    command_parsen(&name, &id)
}

/// Antwort vom Server an den Client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    /// Verketteter Ereignistext (auch leer bei No-op)
    Antwort { response: String },
    /// Eingabe wurde abgewiesen
    Fehler { error: String },
}

impl Response {
    pub fn aus_events(events: &[RouterEvent]) -> Self {
        Self::Antwort {
            response: render_events(events),
        }
    }

    pub fn fehler(meldung: impl Into<String>) -> Self {
        Self::Fehler {
            error: meldung.into(),
        }
    }
}
