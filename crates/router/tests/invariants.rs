//! Property-Tests: Invarianten gelten fuer beliebige Befehlsfolgen

use callcenter_core::{CallId, Command, OperatorId, RouterEvent};
use callcenter_router::{CallRouter, RecordingTimer};
use proptest::prelude::*;

/// Aktion einer zufaelligen Befehlsfolge
#[derive(Debug, Clone)]
enum Aktion {
    Befehl(Command),
    /// Feuert den aktuell scharfen Timeout des n-ten Tickets (falls vorhanden)
    Timeout(usize),
}

fn aktion() -> impl Strategy<Value = Aktion> {
    let call = (0u8..6).prop_map(|n| CallId::from(n.to_string()));
    // "Z" steht nicht im Dienstplan
    let op = prop::sample::select(vec!["A", "B", "C", "Z"]).prop_map(OperatorId::from);

    prop_oneof![
        call.clone().prop_map(|c| Aktion::Befehl(Command::Call(c))),
        op.clone().prop_map(|o| Aktion::Befehl(Command::Answer(o))),
        op.prop_map(|o| Aktion::Befehl(Command::Reject(o))),
        call.prop_map(|c| Aktion::Befehl(Command::Hangup(c))),
        (0usize..4).prop_map(Aktion::Timeout),
    ]
}

proptest! {
    #[test]
    fn invarianten_bleiben_erhalten(aktionen in prop::collection::vec(aktion(), 0..80)) {
        let mut r = CallRouter::mit_timer(["A", "B", "C"], RecordingTimer::default()).unwrap();

        for a in aktionen {
            match a {
                Aktion::Befehl(cmd) => { r.execute(cmd); }
                Aktion::Timeout(n) => {
                    if let Some(ticket) = r.timer().armed.get(n).cloned() {
                        r.ringing_timeout(&ticket);
                    }
                }
            }
            prop_assert!(r.check_invariants().is_ok(), "{:?}", r.check_invariants());

            // Jeder klingelnde Anruf hat genau einen scharfen Timeout
            let snapshot = r.snapshot();
            let klingelnd = snapshot
                .operators
                .iter()
                .filter(|o| o.state == callcenter_core::OperatorState::Ringing)
                .count();
            prop_assert_eq!(klingelnd, r.timer().armed.len());
        }
    }

    #[test]
    fn erster_freier_operator_gewinnt(anzahl in 1usize..3) {
        let mut r = CallRouter::neu(["A", "B", "C"]).unwrap();
        for i in 0..anzahl {
            r.receive_call(CallId::from(format!("x{i}")));
        }
        let events = r.receive_call(CallId::from("neu"));
        let erwartet = ["A", "B", "C"][anzahl];
        prop_assert_eq!(
            &events[1],
            &RouterEvent::Ringing { call: CallId::from("neu"), operator: OperatorId::from(erwartet) }
        );
    }
}
