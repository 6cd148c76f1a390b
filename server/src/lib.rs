//! callcenter-server – Bibliotheks-Root
//!
//! Deklariert alle Betriebsarten und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod client;
pub mod config;
pub mod shell;
pub mod tcp;

use anyhow::{Context, Result};
use callcenter_router::RouterHandle;
use config::ServerConfig;
use tcp::TcpServer;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet Router und TCP-Server und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Router-Actor mit dem Dienstplan starten
    /// 2. TCP-Listener binden
    /// 3. Auf Ctrl-C warten, dann Listener und Verbindungen schliessen
    pub async fn starten(self) -> Result<()> {
        let router = RouterHandle::starten(
            self.config.router.operatoren.iter().cloned(),
            self.config.router.klingel_timeout(),
        )
        .context("Router konnte nicht gestartet werden")?;

        let adresse = self.config.tcp_bind_adresse();
        let server = TcpServer::binden(&adresse, router, &self.config.netzwerk).await?;

        tracing::info!(
            adresse = %server.lokale_adresse()?,
            operatoren = ?self.config.router.operatoren,
            "Server startet"
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
        let server_task = tokio::spawn(server.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        // Kein Empfaenger mehr heisst: Server-Task ist schon beendet
        let _ = shutdown_tx.send(true);
        server_task.await??;

        Ok(())
    }
}
