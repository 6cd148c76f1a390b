//! Identifikationstypen fuer Operatoren und Anrufe
//!
//! Beide IDs werden extern vergeben und verwenden das Newtype-Pattern, damit
//! ein Operator nie versehentlich als Anruf (oder umgekehrt) uebergeben wird.

use serde::{Deserialize, Serialize};

/// Eindeutige Operator-ID aus dem Dienstplan
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(pub String);

impl OperatorId {
    /// Erstellt eine OperatorId aus einem beliebigen String
    pub fn neu(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die ID als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperatorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OperatorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for OperatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anruf-ID, eindeutig solange der Anruf aktiv ist
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    /// Erstellt eine CallId aus einem beliebigen String
    pub fn neu(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CallId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Zustand eines Operators
///
/// `Ringing` und `Busy` existieren nur zusammen mit einer Zuweisung.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorState {
    /// Frei fuer den naechsten Anruf
    #[default]
    Available,
    /// Anruf wird angeboten, aber noch nicht angenommen
    Ringing,
    /// Im Gespraech
    Busy,
}

impl std::fmt::Display for OperatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::Ringing => "ringing",
            Self::Busy => "busy",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_zeigen_rohen_wert() {
        assert_eq!(OperatorId::from("A").to_string(), "A");
        assert_eq!(CallId::neu("42").to_string(), "42");
    }

    #[test]
    fn ids_sind_transparent_serialisiert() {
        let json = serde_json::to_string(&CallId::from("7")).unwrap();
        assert_eq!(json, "\"7\"");
        let op: OperatorId = serde_json::from_str("\"B\"").unwrap();
        assert_eq!(op, OperatorId::from("B"));
    }

    #[test]
    fn standard_zustand_ist_available() {
        assert_eq!(OperatorState::default(), OperatorState::Available);
        assert_eq!(OperatorState::Ringing.to_string(), "ringing");
    }
}
