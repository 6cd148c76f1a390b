//! Interaktive Shell auf dem lokalen Router
//!
//! ```text
//! >>> call 1
//! Call 1 received
//! Call 1 ringing for operator A
//! >>> answer A
//! Call 1 answered by operator A
//! ```
//!
//! Ein- und Ausgabe sind generisch, damit die Shell ohne Terminal getestet
//! werden kann.

use anyhow::Result;
use callcenter_core::render_events;
use callcenter_protocol::text::{hilfe, ROUTER_BEFEHLE};
use callcenter_protocol::{command_parsen, zeile_zerlegen, ProtokollError};
use callcenter_router::RouterHandle;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;

use crate::config::ServerConfig;

pub const PROMPT: &str = ">>> ";

/// Hilfetexte der Shell-eigenen Befehle
const SHELL_BEFEHLE: &[(&str, &str)] = &[
    ("status", "status\tshows every operator and the waiting queue"),
    ("help", "help [command]\tlists commands or describes one"),
    ("exit", "exit\texits the shell (also quit or Ctrl-D)"),
];

/// Ergebnis einer verarbeiteten Zeile
enum Schritt {
    Weiter,
    Ende,
}

/// Startet die Shell auf stdin/stdout mit einem eigenen Router
pub async fn starten(config: &ServerConfig) -> Result<()> {
    let router = RouterHandle::starten(
        config.router.operatoren.iter().cloned(),
        config.router.klingel_timeout(),
    )?;
    let eingabe = tokio::io::BufReader::new(tokio::io::stdin());
    Shell::neu(router, tokio::io::stdout()).ausfuehren(eingabe).await
}

/// Shell-Sitzung ueber einem Router-Handle
pub struct Shell<W> {
    router: RouterHandle,
    ausgabe: W,
}

impl<W: AsyncWrite + Unpin> Shell<W> {
    pub fn neu(router: RouterHandle, ausgabe: W) -> Self {
        Self { router, ausgabe }
    }

    /// Liest Zeilen bis `exit`/`quit` oder EOF
    ///
    /// Timeout-Ereignisse werden ausgegeben, sobald sie eintreffen.
    pub async fn ausfuehren<R: AsyncBufRead + Unpin>(mut self, eingabe: R) -> Result<()> {
        let mut zeilen = eingabe.lines();
        let mut timeouts = self.router.abonnieren();

        self.schreiben(PROMPT).await?;
        loop {
            tokio::select! {
                zeile = zeilen.next_line() => {
                    let Some(zeile) = zeile? else {
                        tracing::debug!("Eingabe beendet");
                        break;
                    };
                    match self.zeile_verarbeiten(&zeile).await? {
                        Schritt::Weiter => self.schreiben(PROMPT).await?,
                        Schritt::Ende => break,
                    }
                }

                ereignisse = timeouts.recv() => {
                    match ereignisse {
                        Ok(events) => {
                            let text = format!("\n{}{PROMPT}", render_events(&events));
                            self.schreiben(&text).await?;
                        }
                        Err(RecvError::Lagged(verpasst)) => {
                            tracing::warn!(verpasst, "Timeout-Ereignisse verpasst");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        }

        self.ausgabe.flush().await?;
        Ok(())
    }

    async fn zeile_verarbeiten(&mut self, zeile: &str) -> Result<Schritt> {
        let Some((wort, argument)) = zeile_zerlegen(zeile) else {
            return Ok(Schritt::Weiter);
        };

        match wort {
            "exit" | "quit" => return Ok(Schritt::Ende),
            "status" => {
                let snapshot = self.router.snapshot().await?;
                self.schreiben(&snapshot.to_string()).await?;
            }
            "help" => {
                let text = hilfe_text(argument);
                self.schreiben(&text).await?;
            }
            _ => match command_parsen(wort, argument) {
                Ok(command) => {
                    let events = self.router.ausfuehren(command).await?;
                    self.schreiben(&render_events(&events)).await?;
                }
                Err(ProtokollError::IdFehlt(name)) => {
                    let usage = hilfe(&name).map_or(name.as_str(), |h| h.usage);
                    self.schreiben(&format!("*** Usage: {usage}\n")).await?;
                }
                Err(e) => {
                    tracing::debug!(fehler = %e, "Unbekannte Eingabe");
                    self.schreiben(&format!("*** Unknown syntax: {}\n", zeile.trim()))
                        .await?;
                }
            },
        }
        Ok(Schritt::Weiter)
    }

    async fn schreiben(&mut self, text: &str) -> Result<()> {
        self.ausgabe.write_all(text.as_bytes()).await?;
        self.ausgabe.flush().await?;
        Ok(())
    }
}

/// Text fuer `help` bzw. `help <befehl>`
fn hilfe_text(befehl: &str) -> String {
    if befehl.is_empty() {
        let mut text = String::from("Documented commands (type help <topic>):\n");
        for h in ROUTER_BEFEHLE {
            text.push_str(&format!("{h}\n"));
        }
        for (_, zeile) in SHELL_BEFEHLE {
            text.push_str(zeile);
            text.push('\n');
        }
        return text;
    }

    if let Some(h) = hilfe(befehl) {
        return format!("{h}\n");
    }
    match SHELL_BEFEHLE.iter().find(|(name, _)| *name == befehl) {
        Some((_, zeile)) => format!("{zeile}\n"),
        None => format!("*** No help on {befehl}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hilfe_uebersicht_enthaelt_alle_befehle() {
        let text = hilfe_text("");
        for name in ["call", "answer", "reject", "hangup", "status", "help", "exit"] {
            assert!(text.contains(name), "{name} fehlt in der Hilfe");
        }
    }

    #[test]
    fn hilfe_fuer_einzelne_befehle() {
        assert_eq!(
            hilfe_text("answer"),
            "answer <id>\tmakes operator <id> answer a call being delivered to it\n"
        );
        assert!(hilfe_text("status").starts_with("status\t"));
        assert_eq!(hilfe_text("dial"), "*** No help on dial\n");
    }
}
