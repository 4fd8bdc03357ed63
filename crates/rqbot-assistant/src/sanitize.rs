//! Cleanup of raw model output before it is sent to chat.

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</?s>").unwrap());

/// Control characters except `\t` and `\n`.
static CONTROL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\x00-\x08\x0B-\x1F\x7F]").unwrap());

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

/// Some free models emit a stray `S` line before the answer.
static LEADING_S: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[sS]\s*[\r\n]+").unwrap());

pub fn sanitize(raw: &str) -> String {
    let s = SENTENCE_TAGS.replace_all(raw, "");
    let s = CONTROL.replace_all(&s, "");
    let s = BLANK_RUNS.replace_all(&s, "\n\n");
    let s = LEADING_S.replace(&s, "");
    s.trim().to_string()
}
