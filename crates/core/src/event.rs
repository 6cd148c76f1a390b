//! Router-Ereignisse
//!
//! Jede Router-Operation erzeugt eine geordnete Folge von Ereignissen. Die
//! Textform (`Display`) ist Teil des externen Vertrags: Shell und TCP-Protokoll
//! geben exakt diese Zeilen aus.

use serde::{Deserialize, Serialize};

use crate::types::{CallId, OperatorId};

/// Alle Ereignisse, die der Call-Router ausgeben kann
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RouterEvent {
    /// Anruf wurde angenommen und ist jetzt aktiv
    Received { call: CallId },
    /// Anruf klingelt bei einem Operator
    Ringing { call: CallId, operator: OperatorId },
    /// Kein Operator frei, Anruf wartet in der Queue
    Queued { call: CallId },
    /// Operator hat den Anruf angenommen
    Answered { call: CallId, operator: OperatorId },
    /// Operator hat den Anruf abgelehnt
    Rejected { call: CallId, operator: OperatorId },
    /// Klingel-Timeout abgelaufen (gleicher Uebergang wie `Rejected`)
    Ignored { call: CallId, operator: OperatorId },
    /// Anrufer hat aufgelegt, bevor ein Gespraech zustande kam
    Missed { call: CallId },
    /// Gespraech beendet, Operator wieder frei
    Finished { call: CallId, operator: OperatorId },
}

impl std::fmt::Display for RouterEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Received { call } => write!(f, "Call {call} received"),
            Self::Ringing { call, operator } => {
                write!(f, "Call {call} ringing for operator {operator}")
            }
            Self::Queued { call } => write!(f, "Call {call} waiting in queue"),
            Self::Answered { call, operator } => {
                write!(f, "Call {call} answered by operator {operator}")
            }
            Self::Rejected { call, operator } => {
                write!(f, "Call {call} rejected by operator {operator}")
            }
            Self::Ignored { call, operator } => {
                write!(f, "Call {call} ignored by operator {operator}")
            }
            Self::Missed { call } => write!(f, "Call {call} missed"),
            Self::Finished { call, operator } => {
                write!(f, "Call {call} finished and operator {operator} available")
            }
        }
    }
}

/// Rendert Ereignisse als zusammenhaengenden Text, jede Zeile mit `\n` abgeschlossen
pub fn render_events(events: &[RouterEvent]) -> String {
    events.iter().map(|e| format!("{e}\n")).collect()
}
