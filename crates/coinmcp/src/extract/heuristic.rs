use lazy_static::lazy_static;
use regex::Regex;

use super::dedup_preserving_order;

lazy_static! {
    static ref BULLET_PREFIX: Regex = Regex::new(r"^\s*([-*•]|\d+\.)\s+").unwrap();
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]\s+").unwrap();
    static ref WORD: Regex = Regex::new(r"[A-Za-z']+").unwrap();
}

const KEYWORD_PREFIXES: [&str; 3] = ["todo:", "action:", "next:"];
const CHECKBOX_MARKERS: [&str; 2] = ["[ ]", "[todo]"];
const IMPERATIVE_STARTERS: [&str; 12] = [
    "add",
    "create",
    "implement",
    "fix",
    "update",
    "write",
    "check",
    "verify",
    "refactor",
    "document",
    "design",
    "investigate",
];

/// Extract action items from notes without any external dependency.
///
/// Bulleted, numbered, checkbox and keyword-prefixed lines are taken as action
/// items. When no line qualifies, sentences starting with a common imperative
/// verb are used instead.
pub fn extract_action_items(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let action_lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| is_action_line(line))
        .collect();

    // sentences are only consulted when no line qualified, even if every
    // qualifying line cleaned down to nothing
    let extracted: Vec<String> = if action_lines.is_empty() {
        split_sentences(text.trim())
            .into_iter()
            .filter(|sentence| looks_imperative(sentence))
            .map(str::to_string)
            .collect()
    } else {
        action_lines
            .into_iter()
            .map(clean_line)
            .filter(|item| !item.is_empty())
            .collect()
    };

    dedup_preserving_order(extracted)
}

fn is_action_line(line: &str) -> bool {
    let lowered = line.trim().to_lowercase();
    if lowered.is_empty() {
        return false;
    }
    BULLET_PREFIX.is_match(&lowered)
        || KEYWORD_PREFIXES
            .iter()
            .any(|prefix| lowered.starts_with(prefix))
        || CHECKBOX_MARKERS
            .iter()
            .any(|marker| lowered.contains(marker))
}

fn clean_line(line: &str) -> String {
    let without_bullet = BULLET_PREFIX.replace(line, "");
    let mut cleaned = without_bullet.trim();
    for marker in CHECKBOX_MARKERS {
        cleaned = strip_prefix_ignore_case(cleaned, marker).trim();
    }
    for prefix in KEYWORD_PREFIXES {
        cleaned = strip_prefix_ignore_case(cleaned, prefix).trim();
    }
    cleaned.to_string()
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> &'a str {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &text[prefix.len()..],
        _ => text,
    }
}

/// Split after `.`, `!` or `?` when followed by whitespace
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for boundary in SENTENCE_END.find_iter(text) {
        // punctuation is ASCII, so the sentence ends one byte into the match
        sentences.push(text[start..boundary.start() + 1].trim());
        start = boundary.end();
    }
    sentences.push(text[start..].trim());
    sentences.retain(|s| !s.is_empty());
    sentences
}

fn looks_imperative(sentence: &str) -> bool {
    WORD.find(sentence)
        .map(|word| {
            let first = word.as_str().to_lowercase();
            IMPERATIVE_STARTERS.contains(&first.as_str())
        })
        .unwrap_or(false)
}
