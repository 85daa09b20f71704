//! N-gram generator: every contiguous token span up to a maximum size.
//!
//! A span is discarded only when *every* token in it is a stop word, so a
//! stop word may still appear inside a longer span ("capital of France").

use crate::lexicon::Lexicon;
use crate::types::{Span, Token};

/// Candidate spans grouped by size: `groups[0]` holds the 1-token spans,
/// `groups[1]` the 2-token spans, and so on up to `max_span_size`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanGroups {
    pub groups: Vec<Vec<Span>>,
}

impl SpanGroups {
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spans of exactly `size` tokens.
    pub fn of_size(&self, size: usize) -> &[Span] {
        size.checked_sub(1)
            .and_then(|i| self.groups.get(i))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All spans, smallest size first, each group in ascending start order.
    pub fn into_flat(self) -> Vec<Span> {
        self.groups.into_iter().flatten().collect()
    }
}

pub fn generate(tokens: &[Token], max_span_size: usize, lexicon: &Lexicon) -> SpanGroups {
    let mut groups = Vec::with_capacity(max_span_size);

    for size in 1..=max_span_size {
        let mut group = Vec::new();
        if size <= tokens.len() {
            for start in 0..=tokens.len() - size {
                let window = &tokens[start..start + size];
                if window.iter().all(|t| lexicon.is_stop_word(&t.text)) {
                    continue;
                }
                group.push(Span {
                    start,
                    end: start + size - 1,
                    text: window
                        .iter()
                        .map(|t| t.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                });
            }
        }
        groups.push(group);
    }

    SpanGroups { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;
    use pretty_assertions::assert_eq;

    fn texts(spans: &[Span]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn generates_all_sizes_with_positions() {
        let tokens = tokenize("Barack Obama was born in Hawaii");
        let groups = generate(&tokens, 3, &Lexicon::default());

        assert_eq!(
            texts(groups.of_size(1)),
            vec!["Barack", "Obama", "born", "Hawaii"]
        );
        assert_eq!(
            texts(groups.of_size(2)),
            vec!["Barack Obama", "Obama was", "was born", "born in", "in Hawaii"]
        );
        let trigram = &groups.of_size(3)[0];
        assert_eq!(trigram.text, "Barack Obama was");
        assert_eq!((trigram.start, trigram.end), (0, 2));
        assert_eq!(trigram.size(), 3);
    }

    #[test]
    fn drops_spans_made_only_of_stop_words() {
        let tokens = tokenize("the capital of the state");
        let groups = generate(&tokens, 2, &Lexicon::default());
        assert!(!texts(groups.of_size(2)).contains(&"of the"));
        assert!(texts(groups.of_size(2)).contains(&"capital of"));
    }

    #[test]
    fn size_larger_than_input_yields_empty_group() {
        let tokens = tokenize("Paris");
        let groups = generate(&tokens, 3, &Lexicon::default());
        assert_eq!(groups.groups.len(), 3);
        assert_eq!(groups.len(), 1);
        assert!(groups.of_size(3).is_empty());
        assert!(groups.of_size(0).is_empty());
    }

    #[test]
    fn stop_word_only_input_generates_nothing() {
        let tokens = tokenize("the and or but");
        assert!(generate(&tokens, 4, &Lexicon::default()).is_empty());
    }
}
