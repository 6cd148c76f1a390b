//! Callcenter-Dispatcher – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet die
//! gewaehlte Betriebsart (Shell, TCP-Server oder TCP-Client).

use anyhow::{Context, Result};
use callcenter_observability::{logging_initialisieren, LogZiel};
use callcenter_server::{client, config::ServerConfig, shell, Server};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "callcenter-server", version, about = "Call-Dispatcher fuer Operatoren")]
struct Cli {
    /// Pfad zur TOML-Konfiguration
    #[arg(long, short, env = "CALLCENTER_CONFIG", default_value = "config.toml", global = true)]
    config: String,

    #[command(subcommand)]
    modus: Option<Modus>,
}

#[derive(Debug, Clone, Subcommand)]
enum Modus {
    /// Interaktive Shell mit eigenem Router (Standard)
    Shell,
    /// TCP-Server fuer JSON-Envelopes
    Serve,
    /// Interaktiver Client fuer einen laufenden Server
    Client {
        /// Server-Adresse (Standard: aus der Konfiguration)
        #[arg(long, short)]
        adresse: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let modus = cli.modus.unwrap_or(Modus::Shell);

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let datei = ServerConfig::laden(&cli.config)?;
    let gefunden = datei.is_some();
    let config = datei.unwrap_or_default();

    // Shell und Client schreiben ihre Ausgabe nach stdout
    let ziel = match modus {
        Modus::Serve => LogZiel::Stdout,
        Modus::Shell | Modus::Client { .. } => LogZiel::Stderr,
    };
    logging_initialisieren(&config.logging.level, &config.logging.format, ziel)
        .context("Logging konnte nicht initialisiert werden")?;

    if !gefunden {
        tracing::warn!(
            pfad = %cli.config,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config,
        modus = ?modus,
        "Callcenter wird initialisiert"
    );

    match modus {
        Modus::Shell => shell::starten(&config).await,
        Modus::Serve => Server::neu(config).starten().await,
        Modus::Client { adresse } => {
            let adresse = adresse.unwrap_or_else(|| config.client_adresse());
            client::starten(&adresse).await
        }
    }
}
