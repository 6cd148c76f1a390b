//! Router-Actor – serialisiert alle Zugriffe auf den Call-Router
//!
//! Ein einzelner tokio-Task besitzt den `CallRouter`. Befehle aus Shell und
//! TCP-Verbindungen kommen ueber eine mpsc-Mailbox, Klingel-Timeouts werden von
//! Timer-Tasks in dieselbe Mailbox gelegt. Damit sieht keine Operation je
//! einen halb angewendeten Zustand.
//!
//! Ereignisse aus Timeouts haben keinen Aufrufer, der auf sie wartet; sie
//! werden per broadcast an alle Abonnenten verteilt.

use std::collections::HashMap;
use std::time::Duration;

use callcenter_core::{CallCenterError, CallId, Command, OperatorId, Result, RouterEvent};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::router::{CallRouter, RouterSnapshot};
use crate::timer::{RingingTicket, RingingTimer};

/// Standard-Klingeldauer bis ein Anruf als ignoriert gilt
pub const DEFAULT_KLINGEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Groesse der Befehls-Mailbox
const MAILBOX_GROESSE: usize = 256;

/// Puffer fuer Timeout-Ereignisse pro Abonnent
const BROADCAST_GROESSE: usize = 64;

/// Nachrichten an den Actor
enum Nachricht {
    Befehl {
        command: Command,
        antwort: oneshot::Sender<Vec<RouterEvent>>,
    },
    Snapshot {
        antwort: oneshot::Sender<RouterSnapshot>,
    },
    Timeout(RingingTicket),
}

// ---------------------------------------------------------------------------
// TokioTimer
// ---------------------------------------------------------------------------

/// Timer-Scheduler auf Basis von `tokio::time::sleep`
///
/// Jeder scharfe Timeout ist ein Task, der nach Ablauf ein `Timeout` in die
/// Mailbox legt. Er haelt nur einen schwachen Sender, damit der Actor endet,
/// sobald alle Handles weg sind.
struct TokioTimer {
    /// `None` = Timeouts deaktiviert
    dauer: Option<Duration>,
    mailbox: mpsc::WeakSender<Nachricht>,
    laufend: HashMap<CallId, JoinHandle<()>>,
}

impl TokioTimer {
    fn neu(dauer: Option<Duration>, mailbox: mpsc::WeakSender<Nachricht>) -> Self {
        Self {
            dauer,
            mailbox,
            laufend: HashMap::new(),
        }
    }
}

impl RingingTimer for TokioTimer {
    fn arm(&mut self, ticket: RingingTicket) {
        let Some(dauer) = self.dauer else {
            return;
        };

        let call = ticket.call.clone();
        let mailbox = self.mailbox.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(dauer).await;
            if let Some(tx) = mailbox.upgrade() {
                // Actor beendet -> Timeout ist gegenstandslos
                let _ = tx.send(Nachricht::Timeout(ticket)).await;
            }
        });

        if let Some(alt) = self.laufend.insert(call, handle) {
            alt.abort();
        }
    }

    fn disarm(&mut self, call: &CallId) {
        if let Some(handle) = self.laufend.remove(call) {
            handle.abort();
        }
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        for (_, handle) in self.laufend.drain() {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// RouterHandle
// ---------------------------------------------------------------------------

/// Handle auf den laufenden Router-Actor
///
/// Clone teilt denselben Actor. Der Actor endet, wenn das letzte Handle
/// gedroppt wird.
#[derive(Clone)]
pub struct RouterHandle {
    tx: mpsc::Sender<Nachricht>,
    ereignisse: broadcast::Sender<Vec<RouterEvent>>,
}

impl RouterHandle {
    /// Baut den Router und startet den Actor-Task
    ///
    /// `klingel_timeout = None` deaktiviert Klingel-Timeouts. Muss innerhalb
    /// einer tokio-Runtime aufgerufen werden.
    pub fn starten<I, O>(roster: I, klingel_timeout: Option<Duration>) -> Result<Self>
    where
        I: IntoIterator<Item = O>,
        O: Into<OperatorId>,
    {
        let (tx, rx) = mpsc::channel(MAILBOX_GROESSE);
        let timer = TokioTimer::neu(klingel_timeout, tx.downgrade());
        let router = CallRouter::mit_timer(roster, timer)?;
        let (ereignisse, _) = broadcast::channel(BROADCAST_GROESSE);

        tracing::info!(
            operatoren = router.roster().len(),
            klingel_timeout_ms = klingel_timeout.map(millis_gesaettigt),
            "Router-Actor gestartet"
        );
        tokio::spawn(actor_schleife(router, rx, ereignisse.clone()));

        Ok(Self { tx, ereignisse })
    }

    /// Fuehrt einen Befehl aus und liefert die erzeugten Ereignisse
    pub async fn ausfuehren(&self, command: Command) -> Result<Vec<RouterEvent>> {
        let (antwort_tx, antwort_rx) = oneshot::channel();
        self.tx
            .send(Nachricht::Befehl {
                command,
                antwort: antwort_tx,
            })
            .await
            .map_err(|_| CallCenterError::RouterBeendet)?;
        antwort_rx.await.map_err(|_| CallCenterError::RouterBeendet)
    }

    /// Aktuelle Momentaufnahme des Router-Zustands
    pub async fn snapshot(&self) -> Result<RouterSnapshot> {
        let (antwort_tx, antwort_rx) = oneshot::channel();
        self.tx
            .send(Nachricht::Snapshot { antwort: antwort_tx })
            .await
            .map_err(|_| CallCenterError::RouterBeendet)?;
        antwort_rx.await.map_err(|_| CallCenterError::RouterBeendet)
    }

    /// Abonniert Ereignisse aus Klingel-Timeouts
    pub fn abonnieren(&self) -> broadcast::Receiver<Vec<RouterEvent>> {
        self.ereignisse.subscribe()
    }
}

/// Millisekunden fuer Logs; sehr lange Dauern werden auf `u64::MAX` gekappt
fn millis_gesaettigt(dauer: Duration) -> u64 {
    u64::try_from(dauer.as_millis()).unwrap_or(u64::MAX)
}

/// Hauptschleife des Actors
async fn actor_schleife<T: RingingTimer>(
    mut router: CallRouter<T>,
    mut rx: mpsc::Receiver<Nachricht>,
    ereignisse: broadcast::Sender<Vec<RouterEvent>>,
) {
    while let Some(nachricht) = rx.recv().await {
        match nachricht {
            Nachricht::Befehl { command, antwort } => {
                tracing::trace!(befehl = %command, "Befehl empfangen");
                let events = router.execute(command);
                // Aufrufer kann inzwischen weg sein (Verbindung getrennt)
                let _ = antwort.send(events);
            }
            Nachricht::Snapshot { antwort } => {
                let _ = antwort.send(router.snapshot());
            }
            Nachricht::Timeout(ticket) => {
                let events = router.ringing_timeout(&ticket);
                if events.is_empty() {
                    continue;
                }
                // Ohne Abonnenten liefert send() einen Fehler, das ist kein Problem
                let zuhoerer = ereignisse.send(events).unwrap_or(0);
                tracing::debug!(call = %ticket.call, zuhoerer, "Timeout-Ereignisse verteilt");
            }
        }
    }

    tracing::info!("Router-Actor beendet");
}
