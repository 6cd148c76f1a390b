//! Fehlertypen fuer den Callcenter-Dispatcher
//!
//! Router-Operationen selbst kennen keine Fehler (ungueltige Befehle sind
//! stille No-ops). Fehler entstehen nur beim Aufbau des Routers und an der
//! Grenze zum Actor.

use thiserror::Error;

/// Globaler Result-Alias
pub type Result<T> = std::result::Result<T, CallCenterError>;

/// Alle Fehler rund um den Call-Router
#[derive(Debug, Error)]
pub enum CallCenterError {
    /// Ungueltiger Dienstplan (leer, leere ID oder doppelte ID)
    #[error("Ungueltiger Dienstplan: {0}")]
    Roster(String),

    /// Interne Invariante verletzt (nur in Tests und Diagnose relevant)
    #[error("Invariante verletzt: {0}")]
    Invariant(String),

    /// Der Router-Actor laeuft nicht mehr
    #[error("Router-Actor beendet")]
    RouterBeendet,
}

impl CallCenterError {
    /// Erstellt einen Dienstplan-Fehler
    pub fn roster(msg: impl Into<String>) -> Self {
        Self::Roster(msg.into())
    }

    /// Erstellt einen Invarianten-Fehler
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = CallCenterError::roster("doppelte Operator-ID 'A'");
        assert_eq!(e.to_string(), "Ungueltiger Dienstplan: doppelte Operator-ID 'A'");
        assert_eq!(CallCenterError::RouterBeendet.to_string(), "Router-Actor beendet");
    }
}
