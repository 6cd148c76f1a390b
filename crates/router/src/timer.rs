//! Schnittstelle zum Scheduling der Klingel-Timeouts
//!
//! Der Router ruft `arm` auf, sobald ein Anruf bei einem Operator klingelt,
//! und `disarm`, sobald die Klingelphase auf anderem Weg endet. Ein Timeout
//! wird spaeter ueber `CallRouter::ringing_timeout` mit dem Ticket
//! zurueckgemeldet und dort erneut gegen den aktuellen Zustand geprueft.

use callcenter_core::{CallId, OperatorId};

/// Identifiziert genau eine Klingelphase
///
/// `seq` unterscheidet wiederholtes Klingeln desselben Anrufs beim selben
/// Operator (z.B. nach einem Reject mit sofortiger Neuzuweisung).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RingingTicket {
    pub call: CallId,
    pub operator: OperatorId,
    pub seq: u64,
}

/// Scheduler fuer Klingel-Timeouts
pub trait RingingTimer {
    /// Startet den Timeout fuer eine neue Klingelphase
    fn arm(&mut self, ticket: RingingTicket);

    /// Bricht einen laufenden Timeout fuer `call` ab (falls vorhanden)
    fn disarm(&mut self, call: &CallId);
}

/// Scheduler ohne Timeouts (Shell ohne Timer, Tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTimer;

impl RingingTimer for NoTimer {
    fn arm(&mut self, _ticket: RingingTicket) {}

    fn disarm(&mut self, _call: &CallId) {}
}

/// Scheduler, der alle Auftraege nur aufzeichnet
///
/// Fuer Tests, die Timeouts von Hand ausloesen wollen.
#[derive(Debug, Default, Clone)]
pub struct RecordingTimer {
    /// Aktuell scharfe Tickets, in Reihenfolge des Scharfschaltens
    pub armed: Vec<RingingTicket>,
    /// Alle `disarm`-Aufrufe
    pub disarmed: Vec<CallId>,
}

impl RecordingTimer {
    /// Das aktuell scharfe Ticket fuer einen Anruf
    pub fn ticket_for(&self, call: &CallId) -> Option<&RingingTicket> {
        self.armed.iter().find(|t| &t.call == call)
    }
}

impl RingingTimer for RecordingTimer {
    fn arm(&mut self, ticket: RingingTicket) {
        self.armed.retain(|t| t.call != ticket.call);
        self.armed.push(ticket);
    }

    fn disarm(&mut self, call: &CallId) {
        self.armed.retain(|t| &t.call != call);
        self.disarmed.push(call.clone());
    }
}
