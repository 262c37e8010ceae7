//! Paragraph-bounded chunking of cleaned text.
//!
//! No tokenizer is involved: the budget is `max_tokens * CHARS_PER_TOKEN`
//! characters, and a chunk is only ever closed between paragraphs.

use std::str::Split;

/// Approximate token-to-character ratio
pub const CHARS_PER_TOKEN: usize = 4;

/// Separator between paragraphs, both for splitting and for rejoining
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const SEPARATOR_CHARS: usize = PARAGRAPH_SEPARATOR.len();

/// Split `text` into chunks of at most `max_tokens * 4` characters
pub fn chunk_text(text: &str, max_tokens: usize) -> Chunks<'_> {
    Chunks {
        paragraphs: text.split(PARAGRAPH_SEPARATOR),
        pending: None,
        budget: max_tokens.saturating_mul(CHARS_PER_TOKEN),
        exhausted: text.is_empty(),
    }
}

/// Lazy, ordered sequence of chunks produced by [`chunk_text`]
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    paragraphs: Split<'a, &'static str>,
    /// Paragraph that overflowed the previous chunk and opens the next one
    pending: Option<&'a str>,
    budget: usize,
    exhausted: bool,
}

impl<'a> Chunks<'a> {
    pub fn budget(&self) -> usize {
        self.budget
    }

    fn next_paragraph(&mut self) -> Option<&'a str> {
        self.pending.take().or_else(|| self.paragraphs.next())
    }
}

impl Iterator for Chunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }

        let mut current: Vec<&str> = Vec::new();
        let mut current_chars = 0;

        while let Some(paragraph) = self.next_paragraph() {
            let paragraph_chars = paragraph.chars().count();
            let added = if current.is_empty() {
                paragraph_chars
            } else {
                SEPARATOR_CHARS + paragraph_chars
            };

            if !current.is_empty() && current_chars + added > self.budget {
                self.pending = Some(paragraph);
                return Some(current.join(PARAGRAPH_SEPARATOR));
            }

            current.push(paragraph);
            current_chars += added;
        }

        self.exhausted = true;
        (!current.is_empty()).then(|| current.join(PARAGRAPH_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(text: &str, max_tokens: usize) -> Vec<String> {
        chunk_text(text, max_tokens).collect()
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(chunks("", 14_000).is_empty());
    }

    #[test]
    fn test_single_short_paragraph() {
        assert_eq!(chunks("Hello world.\nGoodbye.", 14_000), vec!["Hello world.\nGoodbye."]);
    }

    #[test]
    fn test_splits_at_paragraph_boundaries() {
        // budget 8 characters
        let text = "aaaa\n\nbb\n\ncccccc\n\nd";
        assert_eq!(chunks(text, 2), vec!["aaaa\n\nbb", "cccccc", "d"]);
    }

    #[test]
    fn test_oversized_paragraph_kept_whole() {
        let long = "x".repeat(50);
        let text = format!("short\n\n{}\n\ntail", long);
        let result = chunks(&text, 2);
        assert_eq!(result, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn test_chunks_respect_budget() {
        let text = (0..40)
            .map(|i| "word ".repeat(i % 7 + 1).trim_end().to_string())
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR);

        for max_tokens in [1, 3, 5, 10, 25] {
            let budget = max_tokens * CHARS_PER_TOKEN;
            for chunk in chunk_text(&text, max_tokens) {
                let single_paragraph = !chunk.contains(PARAGRAPH_SEPARATOR);
                assert!(
                    chunk.chars().count() <= budget || single_paragraph,
                    "chunk {:?} exceeds budget {}",
                    chunk,
                    budget
                );
            }
        }
    }

    #[test]
    fn test_rejoining_reproduces_input() {
        let text = "Alpha beta.\n\nGamma\ndelta.\n\n\u{e9}t\u{e9} \u{e0} Paris.\n\nOmega.";
        for max_tokens in [0, 1, 2, 4, 100] {
            let rejoined = chunks(text, max_tokens).join(PARAGRAPH_SEPARATOR);
            assert_eq!(rejoined, text, "max_tokens {}", max_tokens);
        }
    }

    #[test]
    fn test_budget_counts_characters_not_bytes() {
        // four two-byte characters fit a one-token budget
        let text = "\u{e9}\u{e9}\u{e9}\u{e9}\n\n\u{e0}";
        assert_eq!(chunks(text, 1), vec!["\u{e9}\u{e9}\u{e9}\u{e9}", "\u{e0}"]);
    }

    #[test]
    fn test_is_lazy_and_deterministic() {
        let text = "one\n\ntwo\n\nthree";
        let mut iter = chunk_text(text, 1);
        assert_eq!(iter.budget(), 4);
        assert_eq!(iter.next().as_deref(), Some("one"));
        assert_eq!(iter.clone().collect::<Vec<_>>(), vec!["two", "three"]);
        assert_eq!(iter.collect::<Vec<_>>(), vec!["two", "three"]);
    }
}
