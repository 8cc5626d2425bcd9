//! Detection of stale manual line wrapping in free text.
//!
//! Older documents wrapped prose by hand at roughly 80 columns. Text fields
//! are now single flowing paragraphs, so a description that still breaks
//! mid-sentence at a wrap-like width is rejected. This is a heuristic: it
//! ignores code fences, lists, blank lines and short labels, and only flags a
//! text once several suspicious breaks agree.

use serde::{Deserialize, Serialize};

/// Tuning for [`WrapHeuristic::is_wrapped`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WrapHeuristic {
    /// Shortest trimmed line length (in characters) that counts as a wrap.
    pub min_line_len: usize,
    /// Longest trimmed line length that counts as a wrap.
    pub max_line_len: usize,
    /// Suspicious breaks needed before the text is flagged.
    pub min_suspicious_breaks: usize,
    /// Lines ending in `:` shorter than this are labels, not prose.
    pub max_label_len: usize,
}

impl Default for WrapHeuristic {
    fn default() -> Self {
        WrapHeuristic {
            min_line_len: 60,
            max_line_len: 95,
            min_suspicious_breaks: 2,
            max_label_len: 20,
        }
    }
}

impl WrapHeuristic {
    /// Returns whether `text` looks manually wrapped.
    pub fn is_wrapped(&self, text: &str) -> bool {
        self.suspicious_breaks(text) >= self.min_suspicious_breaks.max(1)
    }

    /// Counts line boundaries consistent with manual wrapping.
    pub fn suspicious_breaks(&self, text: &str) -> usize {
        if !text.contains('\n') {
            return 0;
        }
        let prose = prose_lines(text, self.max_label_len);
        prose
            .windows(2)
            .filter(|pair| self.is_suspicious(pair[0], pair[1]))
            .count()
    }

    fn is_suspicious(&self, line: &str, next: &str) -> bool {
        let len = line.chars().count();
        if len < self.min_line_len || len > self.max_line_len {
            return false;
        }
        let ends_mid_sentence = line
            .chars()
            .last()
            .is_some_and(|c| !matches!(c, '.' | '!' | '?' | ':' | ','));
        let continues = next
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase() || c == '(');
        ends_mid_sentence && continues
    }
}

/// Trimmed lines that are ordinary prose, in order.
fn prose_lines(text: &str, max_label_len: usize) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut in_code_block = false;
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            continue;
        }
        if in_code_block || trimmed.is_empty() || is_list_item(trimmed) {
            continue;
        }
        if trimmed.ends_with(':') && trimmed.chars().count() < max_label_len {
            continue;
        }
        lines.push(trimmed);
    }
    lines
}

/// Bullet (`-`, `*`) or numbered (`1.`, `2)`, `3:`) list items.
fn is_list_item(line: &str) -> bool {
    if line.starts_with('-') || line.starts_with('*') {
        return true;
    }
    let mut chars = line.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(d), Some(sep), Some(_)) => d.is_ascii_digit() && matches!(sep, '.' | ')' | ':'),
        _ => false,
    }
}
