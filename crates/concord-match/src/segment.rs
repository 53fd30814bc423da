//! Split a document into paragraph and sentence segments with absolute offsets.
//!
//! Offsets are character (Unicode scalar) positions into the source text,
//! half-open, and point at the trimmed segment text.

use serde::{Deserialize, Serialize};

/// Minimum segment length, in characters, for a segment to be a coding unit.
pub const MIN_SEGMENT_CHARS: usize = 10;

/// A candidate coding unit cut from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Position in document order.
    pub index: usize,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Segment with the default minimum length.
pub fn segment_document(content: &str) -> Vec<Segment> {
    segment_with_min(content, MIN_SEGMENT_CHARS)
}

/// Split on blank lines into paragraphs, then on terminal punctuation
/// followed by whitespace into sentences. Segments shorter than `min_chars`
/// after trimming are dropped.
pub fn segment_with_min(content: &str, min_chars: usize) -> Vec<Segment> {
    let chars: Vec<char> = content.chars().collect();
    let mut segments = Vec::new();

    for (p_start, p_end) in paragraphs(&chars) {
        for (s_start, s_end) in sentences(&chars, p_start, p_end) {
            let Some((start, end)) = trim_span(&chars, s_start, s_end) else {
                continue;
            };
            if end - start < min_chars {
                continue;
            }
            segments.push(Segment {
                index: segments.len(),
                text: chars[start..end].iter().collect(),
                start,
                end,
            });
        }
    }

    segments
}

/// Paragraph spans: text separated by a line containing only whitespace.
fn paragraphs(chars: &[char]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\n' {
            // Look across the next line: whitespace only, then another newline?
            let mut j = i + 1;
            while j < chars.len() && chars[j] != '\n' && chars[j].is_whitespace() {
                j += 1;
            }
            if j < chars.len() && chars[j] == '\n' {
                spans.push((start, i));
                let mut k = j;
                while k < chars.len() && chars[k].is_whitespace() {
                    k += 1;
                }
                start = k;
                i = k;
                continue;
            }
        }
        i += 1;
    }

    if start < chars.len() {
        spans.push((start, chars.len()));
    }
    spans
}

/// Sentence spans within `[start, end)`: a boundary is `.`, `!` or `?`
/// immediately followed by whitespace.
fn sentences(chars: &[char], start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut current = start;

    for i in start..end {
        let is_terminal = matches!(chars[i], '.' | '!' | '?');
        if is_terminal && i + 1 < end && chars[i + 1].is_whitespace() {
            spans.push((current, i + 1));
            current = i + 1;
        }
    }

    if current < end {
        spans.push((current, end));
    }
    spans
}

fn trim_span(chars: &[char], mut start: usize, mut end: usize) -> Option<(usize, usize)> {
    while start < end && chars[start].is_whitespace() {
        start += 1;
    }
    while end > start && chars[end - 1].is_whitespace() {
        end -= 1;
    }
    (start < end).then_some((start, end))
}
