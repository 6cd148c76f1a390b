//! Zuweisungs-Index – Operator <-> Anruf in beide Richtungen
//!
//! Beide Maps werden ausschliesslich hier veraendert, damit sie immer exakte
//! Inverse voneinander bleiben.

use std::collections::HashMap;

use callcenter_core::{CallId, OperatorId, OperatorState};

/// Phase einer bestehenden Zuweisung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentPhase {
    /// Anruf klingelt beim Operator
    Ringing,
    /// Operator ist im Gespraech
    Busy,
}

impl From<AssignmentPhase> for OperatorState {
    fn from(phase: AssignmentPhase) -> Self {
        match phase {
            AssignmentPhase::Ringing => OperatorState::Ringing,
            AssignmentPhase::Busy => OperatorState::Busy,
        }
    }
}

/// Zuweisung aus Sicht des Operators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub call: CallId,
    pub phase: AssignmentPhase,
    /// Laufende Nummer der Klingelphase, zu der ein Timeout gehoeren muss
    pub seq: u64,
}

/// Bidirektionaler Index zwischen Operatoren und Anrufen
#[derive(Debug, Default)]
pub struct AssignmentIndex {
    by_operator: HashMap<OperatorId, Assignment>,
    by_call: HashMap<CallId, OperatorId>,
}

impl AssignmentIndex {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Verknuepft Operator und Anruf in der Phase `Ringing`
    ///
    /// Gibt `false` zurueck (ohne Aenderung), wenn eine der beiden Seiten
    /// bereits zugewiesen ist.
    pub fn assign(&mut self, operator: OperatorId, call: CallId, seq: u64) -> bool {
        if self.by_operator.contains_key(&operator) || self.by_call.contains_key(&call) {
            return false;
        }
        self.by_call.insert(call.clone(), operator.clone());
        self.by_operator.insert(
            operator,
            Assignment {
                call,
                phase: AssignmentPhase::Ringing,
                seq,
            },
        );
        true
    }

    /// Loest die Zuweisung eines Operators und gibt sie zurueck
    pub fn unassign_operator(&mut self, operator: &OperatorId) -> Option<Assignment> {
        let assignment = self.by_operator.remove(operator)?;
        self.by_call.remove(&assignment.call);
        Some(assignment)
    }

    /// Loest die Zuweisung eines Anrufs und gibt Operator und Phase zurueck
    pub fn unassign_call(&mut self, call: &CallId) -> Option<(OperatorId, AssignmentPhase)> {
        let operator = self.by_call.remove(call)?;
        let assignment = self.by_operator.remove(&operator)?;
        Some((operator, assignment.phase))
    }

    /// Wechselt eine klingelnde Zuweisung nach `Busy`
    ///
    /// Gibt den Anruf zurueck, wenn der Operator tatsaechlich klingelte.
    pub fn mark_busy(&mut self, operator: &OperatorId) -> Option<CallId> {
        match self.by_operator.get_mut(operator) {
            Some(a) if a.phase == AssignmentPhase::Ringing => {
                a.phase = AssignmentPhase::Busy;
                Some(a.call.clone())
            }
            _ => None,
        }
    }

    pub fn call_for_operator(&self, operator: &OperatorId) -> Option<&Assignment> {
        self.by_operator.get(operator)
    }

    pub fn operator_for_call(&self, call: &CallId) -> Option<&OperatorId> {
        self.by_call.get(call)
    }

    pub fn is_operator_assigned(&self, operator: &OperatorId) -> bool {
        self.by_operator.contains_key(operator)
    }

    pub fn is_call_assigned(&self, call: &CallId) -> bool {
        self.by_call.contains_key(call)
    }

    /// Anzahl der aktiven Zuweisungen
    pub fn len(&self) -> usize {
        self.by_operator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_operator.is_empty()
    }

    /// Prueft, dass beide Maps exakte Inverse sind
    pub fn konsistenz_pruefen(&self) -> Result<(), String> {
        if self.by_operator.len() != self.by_call.len() {
            return Err(format!(
                "Index-Groessen verschieden: {} Operatoren, {} Anrufe",
                self.by_operator.len(),
                self.by_call.len()
            ));
        }
        for (operator, assignment) in &self.by_operator {
            match self.by_call.get(&assignment.call) {
                Some(rueck) if rueck == operator => {}
                _ => {
                    return Err(format!(
                        "Anruf {} zeigt nicht zurueck auf Operator {}",
                        assignment.call, operator
                    ))
                }
            }
        }
        Ok(())
    }
}
