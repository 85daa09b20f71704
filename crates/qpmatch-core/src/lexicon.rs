//! Stop words and relation indicators.
//!
//! The built-in English sets live in compile-time `phf` sets. A [`Lexicon`]
//! starts from those sets and can be replaced wholesale from the `[lexicon]`
//! section of the config file for other languages.

use std::collections::HashSet;

use phf::phf_set;

/// Function words that never form a span on their own: articles,
/// conjunctions, common prepositions and the copulas `is/was/are/were`.
pub static DEFAULT_STOP_WORDS: phf::Set<&'static str> = phf_set! {
    "the", "a", "an",
    "and", "or", "but",
    "in", "on", "at", "to", "for", "of", "with", "by",
    "is", "was", "are", "were",
};

/// Words and phrases that mark a span as likely naming a relation.
pub static DEFAULT_RELATION_INDICATORS: phf::Set<&'static str> = phf_set! {
    "is", "was", "are", "were", "has", "have", "had",
    "born", "died", "located", "created", "founded",
    "married", "wrote", "directed", "invented", "discovered",
    "contains", "belongs", "relates", "connects",
    "instance of", "part of", "member of", "capital of", "owned by",
    "child of", "parent of", "spouse of", "sibling of",
};

/// Lowercased word lists used by the n-gram generator and the kind-filter
/// heuristic.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stop_words: HashSet<String>,
    /// Each indicator pre-split into its words.
    relation_indicators: Vec<Vec<String>>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new(
            DEFAULT_STOP_WORDS.iter().copied(),
            DEFAULT_RELATION_INDICATORS.iter().copied(),
        )
    }
}

impl Lexicon {
    pub fn new<S, R>(stop_words: S, relation_indicators: R) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let stop_words = stop_words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let relation_indicators = relation_indicators
            .into_iter()
            .map(|p| {
                p.as_ref()
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .filter(|words| !words.is_empty())
            .collect();
        Self {
            stop_words,
            relation_indicators,
        }
    }

    /// Build from optional overrides, falling back to the built-in set for
    /// whichever list is `None`.
    pub fn with_overrides(
        stop_words: Option<&[String]>,
        relation_indicators: Option<&[String]>,
    ) -> Self {
        let defaults = Self::default();
        let stop = match stop_words {
            Some(words) => Self::new(words, std::iter::empty::<&str>()).stop_words,
            None => defaults.stop_words,
        };
        let relations = match relation_indicators {
            Some(phrases) => Self::new(std::iter::empty::<&str>(), phrases).relation_indicators,
            None => defaults.relation_indicators,
        };
        Self {
            stop_words: stop,
            relation_indicators: relations,
        }
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    /// True if any relation indicator occurs in `phrase` as a contiguous run of
    /// whole words.
    pub fn suggests_relation(&self, phrase: &str) -> bool {
        let words: Vec<String> = phrase.split_whitespace().map(str::to_lowercase).collect();
        self.relation_indicators.iter().any(|indicator| {
            indicator.len() <= words.len()
                && words
                    .windows(indicator.len())
                    .any(|window| window == indicator.as_slice())
        })
    }
}
