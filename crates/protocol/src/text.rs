//! Textsyntax der Befehle (`call 1`, `answer A`, ...)
//!
//! Wird von der interaktiven Shell und vom TCP-Client benutzt. Beide kennen
//! zusaetzlich eigene Befehle (`status`, `echo`, `exit`), die hier nur
//! zerlegt, aber nicht interpretiert werden.

use callcenter_core::{CallId, Command, OperatorId};

use crate::error::{ProtokollError, ProtokollResult};

/// Hilfeeintrag eines Router-Befehls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BefehlsHilfe {
    pub name: &'static str,
    pub usage: &'static str,
    pub beschreibung: &'static str,
}

impl std::fmt::Display for BefehlsHilfe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}", self.usage, self.beschreibung)
    }
}

/// Die vier Router-Befehle in Anzeige-Reihenfolge
pub const ROUTER_BEFEHLE: &[BefehlsHilfe] = &[
    BefehlsHilfe {
        name: "call",
        usage: "call <id>",
        beschreibung: "makes application receive a call whose id is <id>",
    },
    BefehlsHilfe {
        name: "answer",
        usage: "answer <id>",
        beschreibung: "makes operator <id> answer a call being delivered to it",
    },
    BefehlsHilfe {
        name: "reject",
        usage: "reject <id>",
        beschreibung: "makes operator <id> reject a call being delivered to it",
    },
    BefehlsHilfe {
        name: "hangup",
        usage: "hangup <id>",
        beschreibung: "makes call whose id is <id> be finished",
    },
];

/// Sucht den Hilfeeintrag eines Router-Befehls
pub fn hilfe(name: &str) -> Option<&'static BefehlsHilfe> {
    ROUTER_BEFEHLE.iter().find(|h| h.name == name)
}

/// Zerlegt eine Eingabezeile in Befehlswort und Argument
///
/// Das Argument ist der getrimmte Rest der Zeile (kann leer sein).
/// Leere Zeilen liefern `None`.
pub fn zeile_zerlegen(zeile: &str) -> Option<(&str, &str)> {
    let zeile = zeile.trim();
    if zeile.is_empty() {
        return None;
    }
    match zeile.split_once(char::is_whitespace) {
        Some((wort, rest)) => Some((wort, rest.trim())),
        None => Some((zeile, "")),
    }
}

/// Baut einen Router-Befehl aus Befehlswort und ID
pub fn command_parsen(name: &str, id: &str) -> ProtokollResult<Command> {
    let id = id.trim();
    let command = match name {
        "call" => Command::Call(CallId::neu(id)),
        "answer" => Command::Answer(OperatorId::neu(id)),
        "reject" => Command::Reject(OperatorId::neu(id)),
        "hangup" => Command::Hangup(CallId::neu(id)),
        andere => return Err(ProtokollError::UnbekannterBefehl(andere.to_string())),
    };
    if id.is_empty() {
        return Err(ProtokollError::IdFehlt(name.to_string()));
    }
    Ok(command)
}
