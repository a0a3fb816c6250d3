//! Turn free-form transcript text into caption-sized lines.
//!
//! This isn't sentence detection in any linguistic sense. We split on blank or whitespace-only
//! lines first, break long paragraphs on sentence punctuation, and finally word-wrap anything
//! still too long. The result is deterministic, and running already-segmented output back through is a no-op.

use std::sync::LazyLock;

use regex::Regex;

/// Paragraphs longer than this (in characters) are split into sentences.
pub const PARAGRAPH_SPLIT_THRESHOLD: usize = 140;

/// Lines longer than this (in characters) are word-wrapped.
pub const MAX_LINE_CHARS: usize = 90;

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("paragraph regex is valid"));

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("sentence regex is valid"));

/// Split raw transcript text into an ordered list of non-empty caption lines.
///
/// Single newlines inside a short paragraph are kept, so such a paragraph becomes one
/// multi-line caption.
pub fn split_transcript(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let normalized = normalized.trim();
    if normalized.is_empty() {
        return Vec::new();
    }

    let mut lines = Vec::new();
    for block in PARAGRAPH_BREAK.split(normalized) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }

        if char_len(block) > PARAGRAPH_SPLIT_THRESHOLD {
            lines.extend(split_sentences(block));
        } else {
            lines.push(block.to_owned());
        }
    }

    let mut wrapped = Vec::with_capacity(lines.len());
    for line in lines {
        if char_len(&line) <= MAX_LINE_CHARS {
            wrapped.push(line);
        } else {
            wrapped.extend(wrap_words(&line, MAX_LINE_CHARS));
        }
    }

    wrapped
}

/// Split after each `.`, `!` or `?` that is followed by whitespace. The punctuation stays with
/// the sentence it ends; the whitespace is dropped.
fn split_sentences(block: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in SENTENCE_END.find_iter(block) {
        // The punctuation is a single ASCII byte, so `m.start() + 1` is a char boundary.
        push_trimmed(&mut sentences, &block[start..m.start() + 1]);
        start = m.end();
    }
    push_trimmed(&mut sentences, &block[start..]);

    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece.to_owned());
    }
}

/// Greedy word wrap. Breaks only at whitespace; a word longer than `width` gets a line of its
/// own rather than being cut.
fn wrap_words(line: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        if char_len(&current) + 1 + char_len(word) > width {
            out.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
