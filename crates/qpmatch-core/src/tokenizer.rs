//! Tokenizer: splits raw text into [`Token`]s.
//!
//! Sentence punctuation (`. , ! ? ; :`) is removed, then the text is split on
//! whitespace runs. There is no locale-aware segmentation.

use crate::types::Token;

const SENTENCE_PUNCTUATION: &[char] = &['.', ',', '!', '?', ';', ':'];

pub fn tokenize(text: &str) -> Vec<Token> {
    let stripped: String = text
        .chars()
        .filter(|c| !SENTENCE_PUNCTUATION.contains(c))
        .collect();

    stripped
        .split_whitespace()
        .enumerate()
        .map(|(index, word)| Token {
            text: word.to_string(),
            index,
        })
        .collect()
}
