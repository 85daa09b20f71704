//! Static sentences and lookup corpora used across harnesses.
//!
//! The ids are real Wikidata ids so failures read naturally, but nothing
//! here talks to the network.

use std::collections::HashMap;

use qpmatch::SearchResults;

use super::builders::{described, CorpusBuilder, ResultsBuilder};

pub const OBAMA_SENTENCE: &str = "Barack Obama was born in Hawaii";
pub const EINSTEIN_SENTENCE: &str = "Albert Einstein died in Princeton.";

/// Inputs made entirely of stop words and punctuation.
pub const STOP_WORD_INPUTS: &[&str] = &[
    "the",
    "the and or but",
    "of the, in the, at the.",
    "A an THE",
    "was in by the",
];

/// The three Wikidata items commonly returned for "Hawaii".
pub fn hawaii_results() -> SearchResults {
    ResultsBuilder::new()
        .exact_hit(described("Q782", "Hawaii", "state of the United States of America"))
        .fuzzy_hit(described("Q18094", "Hawaii", "largest island of the Hawaiian archipelago"))
        .fuzzy_hit(described("Q131750", "Hawaii", "1966 film by George Roy Hill"))
        .build()
}

/// Lookup corpus for [`OBAMA_SENTENCE`] and [`EINSTEIN_SENTENCE`].
pub fn biography_corpus() -> CorpusBuilder {
    CorpusBuilder::new()
        .exact("Barack Obama", "Q76", "Barack Obama")
        .phrase(
            "Obama",
            ResultsBuilder::new()
                .fuzzy("Q76", "Barack Obama")
                .fuzzy("Q41773", "Obama")
                .build(),
        )
        .exact("born", "P569", "date of birth")
        .exact("died", "P570", "date of death")
        .phrase("Hawaii", hawaii_results())
        .exact("Albert Einstein", "Q937", "Albert Einstein")
        .exact("Princeton", "Q138518", "Princeton")
        .exact("Paris", "Q90", "Paris")
}

/// A span with three exact and two fuzzy hits, all distinct ids.
pub fn mercury_results() -> SearchResults {
    ResultsBuilder::new()
        .exact("Q308", "Mercury")
        .exact("Q925", "mercury")
        .exact("Q1003", "Mercury Records")
        .fuzzy("Q40936", "Mercury program")
        .fuzzy("Q15991290", "Freddie Mercury")
        .build()
}

/// A two-word name whose parts also resolve on their own.
pub fn new_york_corpus() -> HashMap<String, SearchResults> {
    CorpusBuilder::new()
        .exact("New York", "Q60", "New York City")
        .exact("New", "Q3050394", "New")
        .exact("York", "Q42462", "York")
        .build()
}
