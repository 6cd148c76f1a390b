//! TCP-Server – JSON-Envelopes ueber newline-getrennte Zeilen
//!
//! Jede Verbindung laeuft in einem eigenen Task und teilt sich den
//! Router-Actor mit allen anderen. Pro Request-Zeile geht genau eine
//! Antwortzeile zurueck. Ereignisse aus Klingel-Timeouts werden zusaetzlich
//! unaufgefordert an jede Verbindung geschickt.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use callcenter_protocol::{request_parsen, EnvelopeCodec, ProtokollError, Response};
use callcenter_router::RouterHandle;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio_util::codec::Framed;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::NetzwerkEinstellungen;

/// TCP-Server fuer das Envelope-Protokoll
pub struct TcpServer {
    listener: TcpListener,
    router: RouterHandle,
    max_verbindungen: usize,
    zeilenlimit_bytes: usize,
}

impl TcpServer {
    /// Bindet den Listener
    ///
    /// Port 0 waehlt einen freien Port, siehe `lokale_adresse`.
    pub async fn binden(
        adresse: &str,
        router: RouterHandle,
        netzwerk: &NetzwerkEinstellungen,
    ) -> Result<Self> {
        let listener = TcpListener::bind(adresse)
            .await
            .with_context(|| format!("TCP-Listener auf '{adresse}' nicht moeglich"))?;

        Ok(Self {
            listener,
            router,
            max_verbindungen: netzwerk.max_verbindungen,
            zeilenlimit_bytes: netzwerk.zeilenlimit_bytes,
        })
    }

    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Akzeptiert Verbindungen bis `shutdown_rx` ein `true`-Signal empfaengt
    pub async fn starten(self, mut shutdown_rx: watch::Receiver<bool>) -> Result<()> {
        tracing::info!(
            adresse = %self.lokale_adresse()?,
            max_verbindungen = self.max_verbindungen,
            "TCP-Server gestartet"
        );

        let verbindungszaehler = Arc::new(AtomicUsize::new(0));

        loop {
            tokio::select! {
                ergebnis = self.listener.accept() => {
                    let (stream, peer_addr) = match ergebnis {
                        Ok(v) => v,
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                            continue;
                        }
                    };

                    let aktuelle = verbindungszaehler.fetch_add(1, Ordering::SeqCst);
                    if aktuelle >= self.max_verbindungen {
                        verbindungszaehler.fetch_sub(1, Ordering::SeqCst);
                        tracing::warn!(
                            peer = %peer_addr,
                            max = self.max_verbindungen,
                            "Verbindung abgelehnt: Connection-Limit erreicht"
                        );
                        drop(stream);
                        continue;
                    }

                    let verbindung = Verbindung {
                        id: Uuid::new_v4(),
                        peer_addr,
                        router: self.router.clone(),
                        zeilenlimit_bytes: self.zeilenlimit_bytes,
                    };
                    let span = tracing::info_span!(
                        "verbindung",
                        id = %verbindung.id,
                        peer = %peer_addr
                    );
                    let shutdown = shutdown_rx.clone();
                    let zaehler = Arc::clone(&verbindungszaehler);

                    tokio::spawn(
                        async move {
                            verbindung.verarbeiten(stream, shutdown).await;
                            zaehler.fetch_sub(1, Ordering::SeqCst);
                        }
                        .instrument(span),
                    );
                }

                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("TCP-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!("TCP-Server gestoppt");
        Ok(())
    }
}

/// Eine einzelne Client-Verbindung
struct Verbindung {
    id: Uuid,
    peer_addr: SocketAddr,
    router: RouterHandle,
    zeilenlimit_bytes: usize,
}

impl Verbindung {
    async fn verarbeiten(self, stream: TcpStream, mut shutdown_rx: watch::Receiver<bool>) {
        tracing::info!("Neue Verbindung");

        let mut framed = Framed::new(stream, EnvelopeCodec::with_max_size(self.zeilenlimit_bytes));
        let mut timeouts = self.router.abonnieren();

        loop {
            tokio::select! {
                zeile = framed.next() => {
                    let antwort = match zeile {
                        Some(Ok(zeile)) => match self.anfrage_beantworten(&zeile).await {
                            Some(antwort) => antwort,
                            None => break,
                        },
                        Some(Err(e)) if e.ist_behebbar() => {
                            tracing::warn!(fehler = %e, "Zeile abgewiesen");
                            Response::fehler(e.to_string())
                        }
                        Some(Err(e)) => {
                            tracing::warn!(fehler = %e, "Zeile konnte nicht gelesen werden");
                            if matches!(e, ProtokollError::ZeileZuLang(_)) {
                                let _ = framed.send(Response::fehler(e.to_string())).await;
                            }
                            break;
                        }
                        None => {
                            tracing::info!("Verbindung vom Client getrennt");
                            break;
                        }
                    };
                    if let Err(e) = framed.send(antwort).await {
                        tracing::warn!(fehler = %e, "Senden fehlgeschlagen");
                        break;
                    }
                }

                ereignisse = timeouts.recv() => {
                    match ereignisse {
                        Ok(events) => {
                            if let Err(e) = framed.send(Response::aus_events(&events)).await {
                                tracing::warn!(fehler = %e, "Timeout-Benachrichtigung fehlgeschlagen");
                                break;
                            }
                        }
                        Err(RecvError::Lagged(verpasst)) => {
                            tracing::warn!(verpasst, "Timeout-Benachrichtigungen verpasst");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }

                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Shutdown-Signal, Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        tracing::debug!(peer = %self.peer_addr, id = %self.id, "Verbindung beendet");
    }

    /// Beantwortet eine Request-Zeile
    ///
    /// Ungueltige Zeilen (auch kein UTF-8) ergeben ein `{"error":...}`.
    /// `None` nur wenn der Router-Actor nicht mehr laeuft.
    async fn anfrage_beantworten(&self, zeile: &[u8]) -> Option<Response> {
        let command = match request_parsen(zeile) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(fehler = %e, "Request abgewiesen");
                return Some(Response::fehler(e.to_string()));
            }
        };

        tracing::debug!(befehl = %command, "Request empfangen");
        match self.router.ausfuehren(command).await {
            Ok(events) => Some(Response::aus_events(&events)),
            Err(e) => {
                tracing::error!(fehler = %e, "Router nicht erreichbar");
                None
            }
        }
    }
}
