//! Warteschlange fuer Anrufe ohne freien Operator
//!
//! Neue Anrufe werden hinten angehaengt, abgelehnte Anrufe vorne eingereiht.
//! Jede Anruf-ID kommt hoechstens einmal vor.

use std::collections::{HashSet, VecDeque};

use callcenter_core::CallId;

/// FIFO-Warteschlange mit Einreihen an der Spitze
#[derive(Debug, Default)]
pub struct WaitQueue {
    reihenfolge: VecDeque<CallId>,
    mitglieder: HashSet<CallId>,
}

impl WaitQueue {
    pub fn neu() -> Self {
        Self::default()
    }

    /// Haengt einen Anruf hinten an. Gibt `false` zurueck, wenn er schon wartet.
    pub fn push_back(&mut self, call: CallId) -> bool {
        if !self.mitglieder.insert(call.clone()) {
            return false;
        }
        self.reihenfolge.push_back(call);
        true
    }

    /// Reiht einen Anruf vorne ein. Gibt `false` zurueck, wenn er schon wartet.
    pub fn push_front(&mut self, call: CallId) -> bool {
        if !self.mitglieder.insert(call.clone()) {
            return false;
        }
        self.reihenfolge.push_front(call);
        true
    }

    /// Der vorderste Anruf, ohne ihn zu entfernen
    pub fn peek_front(&self) -> Option<&CallId> {
        self.reihenfolge.front()
    }

    pub fn pop_front(&mut self) -> Option<CallId> {
        let call = self.reihenfolge.pop_front()?;
        self.mitglieder.remove(&call);
        Some(call)
    }

    /// Entfernt einen Anruf an beliebiger Position
    pub fn remove(&mut self, call: &CallId) -> bool {
        if !self.mitglieder.remove(call) {
            return false;
        }
        // Mitgliedschaft ist garantiert, daher genau ein Treffer
        if let Some(pos) = self.reihenfolge.iter().position(|c| c == call) {
            self.reihenfolge.remove(pos);
        }
        true
    }

    pub fn contains(&self, call: &CallId) -> bool {
        self.mitglieder.contains(call)
    }

    pub fn len(&self) -> usize {
        self.reihenfolge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reihenfolge.is_empty()
    }

    /// Iteriert von vorne nach hinten
    pub fn iter(&self) -> impl Iterator<Item = &CallId> {
        self.reihenfolge.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(queue: &WaitQueue) -> Vec<&str> {
        queue.iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn fifo_fuer_neue_anrufe() {
        let mut q = WaitQueue::neu();
        q.push_back("1".into());
        q.push_back("2".into());
        assert_eq!(ids(&q), ["1", "2"]);
        assert_eq!(q.pop_front(), Some("1".into()));
        assert_eq!(q.pop_front(), Some("2".into()));
        assert!(q.is_empty());
    }

    #[test]
    fn abgelehnter_anruf_kommt_nach_vorne() {
        let mut q = WaitQueue::neu();
        q.push_back("2".into());
        q.push_front("1".into());
        assert_eq!(ids(&q), ["1", "2"]);
        assert_eq!(q.peek_front(), Some(&CallId::from("1")));
    }

    #[test]
    fn keine_duplikate() {
        let mut q = WaitQueue::neu();
        assert!(q.push_back("1".into()));
        assert!(!q.push_back("1".into()));
        assert!(!q.push_front("1".into()));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn entfernen_aus_der_mitte() {
        let mut q = WaitQueue::neu();
        for id in ["1", "2", "3"] {
            q.push_back(id.into());
        }
        assert!(q.remove(&"2".into()));
        assert!(!q.remove(&"2".into()));
        assert!(!q.contains(&"2".into()));
        assert_eq!(ids(&q), ["1", "3"]);
    }

    #[test]
    fn peek_veraendert_nichts() {
        let mut q = WaitQueue::neu();
        q.push_back("1".into());
        let _ = q.peek_front();
        assert_eq!(q.len(), 1);
        assert!(q.contains(&"1".into()));
    }
}
