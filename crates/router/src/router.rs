//! Call-Router – Zustandsmaschine der Anrufverteilung
//!
//! Pro Operator gilt:
//!
//! ```text
//! Available --call/drain--> Ringing --answer--> Busy
//!     ^                        |                  |
//!     +---- reject / timeout --+                  |
//!     +---- hangup (missed) ---+                  |
//!     +---- hangup (finished) --------------------+
//! ```
//!
//! Jeder andere Uebergang ist ein stiller No-op ohne Ausgabe. Jede Operation
//! liefert die erzeugten Ereignisse in Ausgabe-Reihenfolge zurueck.

use std::collections::HashSet;

use callcenter_core::{
    CallCenterError, CallId, Command, OperatorId, OperatorState, Result, RouterEvent,
};

use crate::assignment::{AssignmentIndex, AssignmentPhase};
use crate::queue::WaitQueue;
use crate::timer::{NoTimer, RingingTicket, RingingTimer};

/// Wie eine Klingelphase ohne Annahme endete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zurueckweisung {
    /// Operator hat `reject` gesendet
    Abgelehnt,
    /// Klingel-Timeout ist abgelaufen
    Ignoriert,
}

/// Zustand eines Operators in einem Snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSnapshot {
    pub id: OperatorId,
    pub state: OperatorState,
    pub call: Option<CallId>,
}

/// Momentaufnahme des Router-Zustands (Dienstplan-Reihenfolge, Queue von vorne)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSnapshot {
    pub operators: Vec<OperatorSnapshot>,
    pub queue: Vec<CallId>,
}

impl std::fmt::Display for RouterSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for op in &self.operators {
            match &op.call {
                Some(call) => writeln!(f, "Operator {} {} (call {})", op.id, op.state, call)?,
                None => writeln!(f, "Operator {} {}", op.id, op.state)?,
            }
        }
        if self.queue.is_empty() {
            writeln!(f, "Queue empty")
        } else {
            let ids: Vec<&str> = self.queue.iter().map(|c| c.as_str()).collect();
            writeln!(f, "Queue {}", ids.join(", "))
        }
    }
}

/// Der Call-Router
///
/// Besitzt Dienstplan, Zuweisungs-Index, Warteschlange und den Timer-Scheduler.
/// Nicht thread-safe: Aufrufer serialisieren alle Zugriffe (siehe `actor`).
#[derive(Debug)]
pub struct CallRouter<T = NoTimer> {
    /// Operatoren in Dienstplan-Reihenfolge (unveraenderlich)
    roster: Vec<OperatorId>,
    assignments: AssignmentIndex,
    queue: WaitQueue,
    timer: T,
    /// Zaehler fuer Klingelphasen, siehe `RingingTicket::seq`
    letzte_seq: u64,
}

impl CallRouter<NoTimer> {
    /// Erstellt einen Router ohne Klingel-Timeouts
    pub fn neu<I, O>(roster: I) -> Result<Self>
    where
        I: IntoIterator<Item = O>,
        O: Into<OperatorId>,
    {
        Self::mit_timer(roster, NoTimer)
    }
}

impl<T: RingingTimer> CallRouter<T> {
    /// Erstellt einen Router mit dem gegebenen Timer-Scheduler
    ///
    /// Der Dienstplan darf nicht leer sein und keine leeren oder doppelten IDs
    /// enthalten.
    pub fn mit_timer<I, O>(roster: I, timer: T) -> Result<Self>
    where
        I: IntoIterator<Item = O>,
        O: Into<OperatorId>,
    {
        let roster: Vec<OperatorId> = roster.into_iter().map(Into::into).collect();
        if roster.is_empty() {
            return Err(CallCenterError::roster("kein Operator angegeben"));
        }

        let mut gesehen = HashSet::with_capacity(roster.len());
        for op in &roster {
            if op.as_str().trim().is_empty() {
                return Err(CallCenterError::roster("leere Operator-ID"));
            }
            if !gesehen.insert(op) {
                return Err(CallCenterError::roster(format!(
                    "doppelte Operator-ID '{op}'"
                )));
            }
        }

        Ok(Self {
            roster,
            assignments: AssignmentIndex::neu(),
            queue: WaitQueue::neu(),
            timer,
            letzte_seq: 0,
        })
    }

    /// Fuehrt einen transportunabhaengigen Befehl aus
    pub fn execute(&mut self, command: Command) -> Vec<RouterEvent> {
        match command {
            Command::Call(call) => self.receive_call(call),
            Command::Answer(operator) => self.answer_call(&operator),
            Command::Reject(operator) => self.reject_call(&operator),
            Command::Hangup(call) => self.hangup_call(&call),
        }
    }

    /// Neuer Anruf: an den ersten freien Operator oder hinten in die Queue
    pub fn receive_call(&mut self, call: CallId) -> Vec<RouterEvent> {
        if self.is_active(&call) {
            tracing::debug!(call = %call, "Anruf bereits aktiv, ignoriert");
            return Vec::new();
        }

        let mut events = vec![RouterEvent::Received { call: call.clone() }];
        match self.next_available_operator() {
            Some(operator) => self.zustellen(call, operator, &mut events),
            None => {
                self.queue.push_back(call.clone());
                tracing::debug!(
                    call = %call,
                    wartend = self.queue.len(),
                    "Kein Operator frei, Anruf wartet"
                );
                events.push(RouterEvent::Queued { call });
            }
        }
        events
    }

    /// Operator nimmt den klingelnden Anruf an (Ringing -> Busy)
    pub fn answer_call(&mut self, operator: &OperatorId) -> Vec<RouterEvent> {
        let Some(call) = self.assignments.mark_busy(operator) else {
            tracing::debug!(operator = %operator, "answer ohne klingelnden Anruf ignoriert");
            return Vec::new();
        };

        self.timer.disarm(&call);
        tracing::debug!(call = %call, operator = %operator, "Anruf angenommen");
        vec![RouterEvent::Answered {
            call,
            operator: operator.clone(),
        }]
    }

    /// Operator gibt seinen Anruf zurueck (klingelnd oder verbunden)
    ///
    /// Der Anruf geht an die Spitze der Queue, danach wird die Queue abgearbeitet.
    /// Ohne Zuweisung ein No-op.
    pub fn reject_call(&mut self, operator: &OperatorId) -> Vec<RouterEvent> {
        self.zurueckstellen(operator, Zurueckweisung::Abgelehnt)
    }

    /// Anruf wird beendet, egal ob klingelnd, verbunden oder wartend
    pub fn hangup_call(&mut self, call: &CallId) -> Vec<RouterEvent> {
        if let Some((operator, phase)) = self.assignments.unassign_call(call) {
            let mut events = Vec::with_capacity(2);
            match phase {
                AssignmentPhase::Ringing => {
                    self.timer.disarm(call);
                    tracing::debug!(call = %call, operator = %operator, "Aufgelegt waehrend es klingelte");
                    events.push(RouterEvent::Missed { call: call.clone() });
                }
                AssignmentPhase::Busy => {
                    tracing::debug!(call = %call, operator = %operator, "Gespraech beendet");
                    events.push(RouterEvent::Finished {
                        call: call.clone(),
                        operator,
                    });
                }
            }
            self.process_call_queue(&mut events);
            return events;
        }

        if self.queue.remove(call) {
            tracing::debug!(call = %call, "Aufgelegt waehrend der Wartezeit");
            return vec![RouterEvent::Missed { call: call.clone() }];
        }

        tracing::debug!(call = %call, "hangup fuer unbekannten Anruf ignoriert");
        Vec::new()
    }

    /// Rueckmeldung eines abgelaufenen Klingel-Timeouts
    ///
    /// Wirkt nur, wenn genau diese Klingelphase noch laeuft; sonst No-op.
    pub fn ringing_timeout(&mut self, ticket: &RingingTicket) -> Vec<RouterEvent> {
        let aktuell = matches!(
            self.assignments.call_for_operator(&ticket.operator),
            Some(a) if a.call == ticket.call
                && a.phase == AssignmentPhase::Ringing
                && a.seq == ticket.seq
        );
        if !aktuell {
            tracing::debug!(
                call = %ticket.call,
                operator = %ticket.operator,
                "Veralteter Klingel-Timeout verworfen"
            );
            return Vec::new();
        }

        tracing::info!(
            call = %ticket.call,
            operator = %ticket.operator,
            "Klingel-Timeout abgelaufen"
        );
        self.zurueckstellen(&ticket.operator, Zurueckweisung::Ignoriert)
    }

    /// Zustand eines Operators, `None` wenn er nicht im Dienstplan steht
    pub fn operator_state(&self, operator: &OperatorId) -> Option<OperatorState> {
        if !self.roster.contains(operator) {
            return None;
        }
        Some(
            self.assignments
                .call_for_operator(operator)
                .map(|a| a.phase.into())
                .unwrap_or(OperatorState::Available),
        )
    }

    /// Ist der Anruf aktiv (klingelnd, verbunden oder wartend)?
    pub fn is_active(&self, call: &CallId) -> bool {
        self.assignments.is_call_assigned(call) || self.queue.contains(call)
    }

    pub fn roster(&self) -> &[OperatorId] {
        &self.roster
    }

    pub fn assignments(&self) -> &AssignmentIndex {
        &self.assignments
    }

    pub fn queue(&self) -> &WaitQueue {
        &self.queue
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Momentaufnahme fuer Shell-Status und Tests
    pub fn snapshot(&self) -> RouterSnapshot {
        let operators = self
            .roster
            .iter()
            .map(|id| {
                let assignment = self.assignments.call_for_operator(id);
                OperatorSnapshot {
                    id: id.clone(),
                    state: assignment
                        .map(|a| a.phase.into())
                        .unwrap_or(OperatorState::Available),
                    call: assignment.map(|a| a.call.clone()),
                }
            })
            .collect();

        RouterSnapshot {
            operators,
            queue: self.queue.iter().cloned().collect(),
        }
    }

    /// Prueft alle strukturellen Invarianten
    pub fn check_invariants(&self) -> Result<()> {
        self.assignments
            .konsistenz_pruefen()
            .map_err(CallCenterError::invariant)?;

        let mut zugewiesen = 0;
        for op in &self.roster {
            if let Some(a) = self.assignments.call_for_operator(op) {
                zugewiesen += 1;
                if self.queue.contains(&a.call) {
                    return Err(CallCenterError::invariant(format!(
                        "Anruf {} ist zugewiesen und wartet zugleich",
                        a.call
                    )));
                }
            }
        }
        if zugewiesen != self.assignments.len() {
            return Err(CallCenterError::invariant(
                "Zuweisung an Operator ausserhalb des Dienstplans",
            ));
        }

        let eindeutig: HashSet<&CallId> = self.queue.iter().collect();
        if eindeutig.len() != self.queue.len() {
            return Err(CallCenterError::invariant("Anruf mehrfach in der Queue"));
        }
        Ok(())
    }

    /// Erster freier Operator in Dienstplan-Reihenfolge
    fn next_available_operator(&self) -> Option<OperatorId> {
        self.roster
            .iter()
            .find(|op| !self.assignments.is_operator_assigned(op))
            .cloned()
    }

    /// Loest die Zuweisung des Operators; Anruf an die Spitze der Queue, dann Queue abarbeiten
    fn zurueckstellen(
        &mut self,
        operator: &OperatorId,
        grund: Zurueckweisung,
    ) -> Vec<RouterEvent> {
        let Some(assignment) = self.assignments.unassign_operator(operator) else {
            tracing::debug!(operator = %operator, ?grund, "Kein zugewiesener Anruf, ignoriert");
            return Vec::new();
        };

        let call = assignment.call;
        self.timer.disarm(&call);
        self.queue.push_front(call.clone());
        tracing::debug!(call = %call, operator = %operator, ?grund, "Anruf zurueck in die Queue");

        let operator = operator.clone();
        let mut events = vec![match grund {
            Zurueckweisung::Abgelehnt => RouterEvent::Rejected { call, operator },
            Zurueckweisung::Ignoriert => RouterEvent::Ignored { call, operator },
        }];
        self.process_call_queue(&mut events);
        events
    }

    /// Weist den vordersten wartenden Anruf dem naechsten freien Operator zu
    ///
    /// Der Anruf verlaesst die Queue nur, wenn ein Operator gefunden wurde.
    fn process_call_queue(&mut self, events: &mut Vec<RouterEvent>) {
        if self.queue.peek_front().is_none() {
            return;
        }
        let Some(operator) = self.next_available_operator() else {
            return;
        };
        if let Some(call) = self.queue.pop_front() {
            self.zustellen(call, operator, events);
        }
    }

    /// Laesst einen Anruf bei einem freien Operator klingeln und startet den Timeout
    fn zustellen(&mut self, call: CallId, operator: OperatorId, events: &mut Vec<RouterEvent>) {
        self.letzte_seq += 1;
        let seq = self.letzte_seq;
        if !self.assignments.assign(operator.clone(), call.clone(), seq) {
            tracing::warn!(call = %call, operator = %operator, "Zuweisung nicht moeglich");
            return;
        }

        tracing::debug!(call = %call, operator = %operator, seq, "Anruf klingelt");
        self.timer.arm(RingingTicket {
            call: call.clone(),
            operator: operator.clone(),
            seq,
        });
        events.push(RouterEvent::Ringing { call, operator });
    }
}
