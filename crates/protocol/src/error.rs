//! Fehlertypen fuer das Protokoll
//!
//! Alle Varianten ausser `Io` werden dem Client als Fehler-Envelope
//! zurueckgeschickt und erreichen den Router nie.

use thiserror::Error;

/// Fehler beim Parsen oder Kodieren von Eingaben
#[derive(Debug, Error)]
pub enum ProtokollError {
    /// Zeile ist kein gueltiges Request-JSON (oder ein Pflichtfeld fehlt)
    #[error("Ungueltiges Request: {0}")]
    UngueltigesRequest(String),

    /// Befehlsname ist unbekannt
    #[error("Unbekannter Befehl: {0}")]
    UnbekannterBefehl(String),

    /// Befehl ohne ID
    #[error("ID fehlt fuer Befehl '{0}'")]
    IdFehlt(String),

    /// Zeile ueberschreitet das konfigurierte Limit
    #[error("Zeile zu lang (Maximum: {0} Bytes)")]
    ZeileZuLang(usize),

    /// Serialisierung einer Antwort fehlgeschlagen
    #[error("Serialisierung fehlgeschlagen: {0}")]
    Serialisierung(#[from] serde_json::Error),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProtokollResult<T> = Result<T, ProtokollError>;

impl ProtokollError {
    /// Kann die Verbindung nach diesem Fehler weiterlaufen?
    pub fn ist_behebbar(&self) -> bool {
        matches!(
            self,
            Self::UngueltigesRequest(_) | Self::UnbekannterBefehl(_) | Self::IdFehlt(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = ProtokollError::UnbekannterBefehl("dial".into());
        assert_eq!(e.to_string(), "Unbekannter Befehl: dial");
        assert_eq!(
            ProtokollError::IdFehlt("call".into()).to_string(),
            "ID fehlt fuer Befehl 'call'"
        );
    }

    #[test]
    fn behebbarkeit() {
        assert!(ProtokollError::IdFehlt("call".into()).ist_behebbar());
        assert!(!ProtokollError::ZeileZuLang(10).ist_behebbar());
    }
}
