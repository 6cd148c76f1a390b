//! callcenter-router – Zustandsmaschine fuer die Anrufverteilung
//!
//! ## Architektur
//!
//! ```text
//! RouterHandle (Clone, pro Shell/Verbindung)
//!     |  mpsc: Command + oneshot-Antwort
//!     v
//! Router-Actor (ein Task, besitzt den CallRouter)
//!     |
//!     +-- AssignmentIndex  (Operator <-> Anruf, beidseitig O(1))
//!     +-- WaitQueue        (FIFO, abgelehnte Anrufe vorne)
//!     +-- RingingTimer     (Klingel-Timeouts, feuern zurueck in die Mailbox)
//!     |
//!     v
//! broadcast: Timeout-Ereignisse an alle Zuhoerer
//! ```

pub mod actor;
pub mod assignment;
pub mod queue;
pub mod router;
pub mod timer;

// Bequeme Re-Exporte
pub use actor::{RouterHandle, DEFAULT_KLINGEL_TIMEOUT};
pub use assignment::{Assignment, AssignmentIndex, AssignmentPhase};
pub use queue::WaitQueue;
pub use router::{CallRouter, OperatorSnapshot, RouterSnapshot};
pub use timer::{NoTimer, RecordingTimer, RingingTicket, RingingTimer};
