//! Befehle an den Call-Router
//!
//! Transportunabhaengig: Shell und TCP-Protokoll uebersetzen ihre Eingaben
//! in diese vier Varianten.

use serde::{Deserialize, Serialize};

use crate::types::{CallId, OperatorId};

/// Ein Befehl an den Router
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Neuer eingehender Anruf
    Call(CallId),
    /// Operator nimmt den klingelnden Anruf an
    Answer(OperatorId),
    /// Operator lehnt den klingelnden Anruf ab
    Reject(OperatorId),
    /// Anruf wird beendet (egal ob wartend, klingelnd oder verbunden)
    Hangup(CallId),
}

impl Command {
    /// Name des Befehls wie er in Shell und Protokoll verwendet wird
    pub fn name(&self) -> &'static str {
        match self {
            Self::Call(_) => "call",
            Self::Answer(_) => "answer",
            Self::Reject(_) => "reject",
            Self::Hangup(_) => "hangup",
        }
    }

    /// Die uebergebene ID als String
    pub fn id(&self) -> &str {
        match self {
            Self::Call(id) | Self::Hangup(id) => id.as_str(),
            Self::Answer(op) | Self::Reject(op) => op.as_str(),
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_und_id() {
        let cmd = Command::Reject(OperatorId::from("A"));
        assert_eq!(cmd.name(), "reject");
        assert_eq!(cmd.id(), "A");
        assert_eq!(cmd.to_string(), "reject A");
    }
}
