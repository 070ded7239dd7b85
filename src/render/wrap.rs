//! Word wrapping against measured pixel widths.
//!
//! Two passes per line: a character-count guess from the font's average
//! glyph width picks a candidate break, then the candidate is measured and
//! the break moved left or right until the line is the longest word prefix
//! that fits. Words wider than the whole line are hard-broken.

use super::font::Font;

const SAMPLE_TEXT: &str = "the quick brown fox jumps over a lazy dog";

/// Wrap `text` so every returned line measures at most `max_width`.
pub fn wrap_text(text: &str, font: &Font, max_width: u32) -> Vec<String> {
    let max_width = max_width.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();
    let limit = chars_per_line(font, max_width);
    let fits = |from: usize, to: usize| font.measure(&words[from..to].join(" ")) <= max_width;

    let mut lines = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let mut end = coarse_break(&words, start, limit);
        while end > start + 1 && !fits(start, end) {
            end -= 1;
        }
        while end < words.len() && fits(start, end + 1) {
            end += 1;
        }

        if end == start + 1 && !fits(start, end) {
            lines.extend(hard_break(words[start], font, max_width));
        } else {
            lines.push(words[start..end].join(" "));
        }
        start = end;
    }
    lines
}

fn chars_per_line(font: &Font, max_width: u32) -> usize {
    let sample_chars = SAMPLE_TEXT.chars().count() as u32;
    let average = font.measure(SAMPLE_TEXT).div_ceil(sample_chars).max(1);
    (max_width / average).max(1) as usize
}

/// End (exclusive) of the line starting at `start` by character count alone.
fn coarse_break(words: &[&str], start: usize, limit: usize) -> usize {
    let mut end = start + 1;
    let mut len = words[start].chars().count();
    while end < words.len() {
        let next = len + 1 + words[end].chars().count();
        if next > limit {
            break;
        }
        len = next;
        end += 1;
    }
    end
}

/// Split a single word into chunks that each fit; one char minimum per chunk.
fn hard_break(word: &str, font: &Font, max_width: u32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if font.measure(&current) > max_width && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
