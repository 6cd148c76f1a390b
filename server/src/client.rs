//! TCP-Client-Shell fuer einen laufenden Server
//!
//! Schickt `call|answer|reject|hangup <id>` als JSON-Envelope und gibt den
//! Text jeder eingehenden Antwort aus, auch unaufgeforderte
//! Timeout-Benachrichtigungen. Nach EOF auf der Eingabe liest der Client
//! weiter, bis der Server fuer `NACHLAUF` schweigt oder die Verbindung schliesst.
//! Antworten und unaufgeforderte Zeilen sind auf dem Draht nicht
//! unterscheidbar, deshalb wird nicht mitgezaehlt.

use std::time::Duration;

use anyhow::{Context, Result};
use callcenter_protocol::text::hilfe;
use callcenter_protocol::{command_parsen, zeile_zerlegen, EnvelopeCodec, ProtokollError, Request, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

/// Ruhezeit nach EOF, nach der keine Antwort mehr erwartet wird
pub const NACHLAUF: Duration = Duration::from_secs(1);

/// Verbindet sich mit `adresse` und liest Befehle von stdin
pub async fn starten(adresse: &str) -> Result<()> {
    let eingabe = tokio::io::BufReader::new(tokio::io::stdin());
    ausfuehren(adresse, eingabe, tokio::io::stdout()).await
}

/// Client-Schleife mit beliebiger Ein- und Ausgabe
pub async fn ausfuehren<R, W>(adresse: &str, eingabe: R, mut ausgabe: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let stream = TcpStream::connect(adresse)
        .await
        .with_context(|| format!("Verbindung zu '{adresse}' fehlgeschlagen"))?;
    tracing::info!(adresse, "Mit Server verbunden");

    let mut framed = Framed::new(stream, EnvelopeCodec::new());
    let mut zeilen = eingabe.lines();
    let mut eingabe_offen = true;

    loop {
        tokio::select! {
            zeile = zeilen.next_line(), if eingabe_offen => {
                let Some(zeile) = zeile? else {
                    eingabe_offen = false;
                    continue;
                };
                let Some((wort, argument)) = zeile_zerlegen(&zeile) else {
                    continue;
                };

                let text = match wort {
                    "exit" | "quit" => break,
                    "echo" => format!("{argument}\n"),
                    _ => match command_parsen(wort, argument) {
                        Ok(command) => {
                            framed.send(Request::from(&command)).await?;
                            continue;
                        }
                        Err(ProtokollError::IdFehlt(name)) => {
                            let usage = hilfe(&name).map_or(name.as_str(), |h| h.usage);
                            format!("*** Usage: {usage}\n")
                        }
                        Err(_) => format!("*** Unknown syntax: {}\n", zeile.trim()),
                    },
                };
                ausgabe.write_all(text.as_bytes()).await?;
                ausgabe.flush().await?;
            }

            nachricht = framed.next() => {
                let Some(zeile) = nachricht else {
                    tracing::info!("Server hat die Verbindung geschlossen");
                    break;
                };
                let zeile = zeile?;

                let text = match serde_json::from_slice::<Response>(&zeile) {
                    Ok(Response::Antwort { response }) => response,
                    Ok(Response::Fehler { error }) => format!("*** Error: {error}\n"),
                    Err(e) => {
                        tracing::warn!(fehler = %e, "Unverstaendliche Antwort vom Server");
                        continue;
                    }
                };
                ausgabe.write_all(text.as_bytes()).await?;
                ausgabe.flush().await?;
            }

            _ = tokio::time::sleep(NACHLAUF), if !eingabe_offen => {
                tracing::debug!("Keine weiteren Antworten vom Server");
                break;
            }
        }
    }

    ausgabe.flush().await?;
    Ok(())
}
