//! Pattern-based intent extraction.
//!
//! Direct messages go through an ordered rule list where the first match
//! wins. Group messages must mention the bot; the first word after the
//! mention is the command name and the rest is its argument.

use once_cell::sync::Lazy;
use regex::Regex;

/// The fixed set of commands the router understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Play,
    Pause,
    Next,
    Volume,
    Queue,
    Clear,
    Label,
    Help,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Next => "next",
            Command::Volume => "volume",
            Command::Queue => "queue",
            Command::Clear => "clear",
            Command::Label => "label",
            Command::Help => "help",
        }
    }

    /// Resolve a command word (English or Portuguese, any case).
    pub fn from_word(word: &str) -> Option<Self> {
        let lower = word.to_lowercase();
        let cmd = match lower.as_str() {
            "play" | "tocar" | "soltar" => Command::Play,
            "pause" | "pausar" | "parar" => Command::Pause,
            "next" | "pular" | "próxima" | "proxima" => Command::Next,
            "vol" | "volume" => Command::Volume,
            "queue" | "fila" => Command::Queue,
            "clear" | "limpar" => Command::Clear,
            "label" | "rotulo" | "rótulo" => Command::Label,
            "help" | "ajuda" => Command::Help,
            _ => return None,
        };
        Some(cmd)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed command and its (possibly empty) argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intent {
    pub name: Command,
    pub argument: String,
}

impl Intent {
    pub fn new(name: Command, argument: impl Into<String>) -> Self {
        Self {
            name,
            argument: argument.into(),
        }
    }
}

/// How the event reached the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    Direct,
    Group { mentioned: bool },
}

/// Parse `text` into an intent. `None` means "no intent".
pub fn parse(text: &str, addressing: Addressing) -> Option<Intent> {
    match addressing {
        Addressing::Direct => parse_direct(text),
        Addressing::Group { mentioned: false } => None,
        Addressing::Group { mentioned: true } => parse_addressed(strip_mentions(text)),
    }
}

/// Drop everything up to and including the first run of `@` tokens.
///
/// Text without any `@` token is returned trimmed and otherwise untouched.
pub fn strip_mentions(text: &str) -> &str {
    let trimmed = text.trim();
    // Only an '@' that starts a token is a mention; `x@y` is not.
    let Some(at) = trimmed
        .char_indices()
        .find(|&(i, c)| c == '@' && (i == 0 || trimmed[..i].ends_with(char::is_whitespace)))
        .map(|(i, _)| i)
    else {
        return trimmed;
    };

    let mut rest = &trimmed[at..];
    while rest.starts_with('@') {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    rest
}

fn parse_addressed(text: &str) -> Option<Intent> {
    let mut parts = text.splitn(2, char::is_whitespace);
    let word = parts.next().filter(|w| !w.is_empty())?;
    let name = Command::from_word(word)?;
    let argument = parts.next().unwrap_or("").trim();
    Some(Intent::new(name, argument))
}

struct Rule {
    name: Command,
    pattern: Regex,
}

fn rule(name: Command, pattern: &str) -> Rule {
    Rule {
        name,
        pattern: Regex::new(pattern).unwrap(),
    }
}

/// Evaluated top to bottom; the bare URL rule must stay last.
static DIRECT_RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(Command::Volume, r"(?i)^vol(?:ume)?\s+(\d+)\s*%?$"),
        rule(Command::Play, r"(?i)^(?:play|tocar|soltar)(?:\s+(.*))?$"),
        rule(Command::Pause, r"(?i)^(?:pause|pausar|parar)$"),
        rule(Command::Next, r"(?i)^(?:next|pular|próxima|proxima)$"),
        rule(Command::Queue, r"(?i)^(?:queue|fila)$"),
        rule(Command::Clear, r"(?i)^(?:clear|limpar)$"),
        rule(Command::Help, r"(?i)^(?:help|ajuda)$"),
        rule(Command::Label, r"(?i)^(?:label|rotulo|rótulo)(?:\s+(.*))?$"),
        rule(Command::Play, r"(?i)^(https?://\S+)$"),
    ]
});

fn parse_direct(text: &str) -> Option<Intent> {
    let text = text.trim();
    DIRECT_RULES.iter().find_map(|r| {
        let caps = r.pattern.captures(text)?;
        let argument = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        Some(Intent::new(r.name, argument))
    })
}

/// What a `play` argument refers to, decided at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayTarget {
    Url(String),
    /// Code of a previously imported item, `#` prefix removed.
    LocalId(String),
    Search(String),
}

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());

static LOCAL_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:#\d{1,6}|[A-Za-z]\d{3,8})$").unwrap());

/// Classify a play argument. URLs win, then local ids, then free text.
/// Returns `None` for an empty argument.
pub fn classify_play(argument: &str) -> Option<PlayTarget> {
    let arg = argument.trim();
    if arg.is_empty() {
        return None;
    }
    let target = if URL.is_match(arg) {
        PlayTarget::Url(arg.to_string())
    } else if LOCAL_ID.is_match(arg) {
        PlayTarget::LocalId(arg.trim_start_matches('#').to_string())
    } else {
        PlayTarget::Search(arg.to_string())
    };
    Some(target)
}
