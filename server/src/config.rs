//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass Shell, Server und Client ohne
//! Konfigurationsdatei lauffaehig sind.

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Vollstaendige Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Dienstplan und Klingeldauer
    pub router: RouterEinstellungen,
    /// Netzwerk-Einstellungen (TCP-Server und Client)
    pub netzwerk: NetzwerkEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Router-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterEinstellungen {
    /// Operatoren in Auswahl-Reihenfolge
    pub operatoren: Vec<String>,
    /// Sekunden bis ein klingelnder Anruf als ignoriert gilt (0 = nie)
    pub klingel_timeout_sek: u64,
}

impl Default for RouterEinstellungen {
    fn default() -> Self {
        Self {
            operatoren: vec!["A".into(), "B".into()],
            klingel_timeout_sek: 10,
        }
    }
}

impl RouterEinstellungen {
    /// Klingeldauer, `None` wenn Timeouts abgeschaltet sind
    pub fn klingel_timeout(&self) -> Option<Duration> {
        (self.klingel_timeout_sek > 0).then(|| Duration::from_secs(self.klingel_timeout_sek))
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse des TCP-Servers
    pub bind_adresse: String,
    /// Port des TCP-Servers
    pub port: u16,
    /// Maximale gleichzeitige Verbindungen
    pub max_verbindungen: usize,
    /// Maximale Laenge einer Request-Zeile
    pub zeilenlimit_bytes: usize,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            port: 5678,
            max_verbindungen: 100,
            zeilenlimit_bytes: 8192,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error" (oder EnvFilter-Syntax)
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    ///
    /// `None` wenn die Datei nicht existiert. Der Aufrufer entscheidet
    /// ueber Standardwerte und meldet das erst, wenn das Logging steht.
    pub fn laden(pfad: &str) -> anyhow::Result<Option<Self>> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => Self::aus_toml(&inhalt)
                .map(Some)
                .with_context(|| format!("Konfigurationsfehler in '{pfad}'")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Konfigurationsdatei '{pfad}' nicht lesbar"))
            }
        }
    }

    /// Parst eine Konfiguration aus einem TOML-String
    pub fn aus_toml(inhalt: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(inhalt)?)
    }

    /// Gibt die vollstaendige Bind-Adresse fuer TCP zurueck
    pub fn tcp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.port)
    }

    /// Adresse, zu der sich der Client verbindet
    ///
    /// Eine Wildcard-Bind-Adresse wird durch localhost ersetzt.
    pub fn client_adresse(&self) -> String {
        let host = match self.netzwerk.bind_adresse.as_str() {
            "0.0.0.0" | "" => "127.0.0.1",
            "::" => "::1",
            andere => andere,
        };
        if host.contains(':') {
            format!("[{host}]:{}", self.netzwerk.port)
        } else {
            format!("{host}:{}", self.netzwerk.port)
        }
    }
}
