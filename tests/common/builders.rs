//! Test builders: ergonomic constructors for hits, search results and
//! ready-to-use transformers.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use qpmatch::cache::DisabledCache;
use qpmatch::types::Hit;
use qpmatch::{
    FixtureBackend, LookupCache, LookupClient, SearchBackend, SearchResults, Transformer,
};

pub fn hit(id: &str, label: &str) -> Hit {
    Hit {
        id: id.to_string(),
        label: label.to_string(),
        description: None,
    }
}

pub fn described(id: &str, label: &str, description: &str) -> Hit {
    Hit {
        description: Some(description.to_string()),
        ..hit(id, label)
    }
}

// ---------------------------------------------------------------------------
// ResultsBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`SearchResults`].
///
/// ```rust
/// let results = ResultsBuilder::new()
///     .exact("Q782", "Hawaii")
///     .fuzzy("Q18094", "Hawaii island")
///     .build();
/// ```
#[derive(Default)]
pub struct ResultsBuilder {
    results: SearchResults,
}

impl ResultsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exact(mut self, id: &str, label: &str) -> Self {
        self.results.exact.push(hit(id, label));
        self
    }

    pub fn fuzzy(mut self, id: &str, label: &str) -> Self {
        self.results.fuzzy.push(hit(id, label));
        self
    }

    pub fn exact_hit(mut self, hit: Hit) -> Self {
        self.results.exact.push(hit);
        self
    }

    pub fn fuzzy_hit(mut self, hit: Hit) -> Self {
        self.results.fuzzy.push(hit);
        self
    }

    pub fn build(self) -> SearchResults {
        self.results
    }
}

// ---------------------------------------------------------------------------
// CorpusBuilder
// ---------------------------------------------------------------------------

/// Phrase → results map, convertible into a [`FixtureBackend`].
#[derive(Default, Clone)]
pub struct CorpusBuilder {
    entries: HashMap<String, SearchResults>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phrase(mut self, phrase: &str, results: SearchResults) -> Self {
        self.entries.insert(phrase.to_string(), results);
        self
    }

    /// Shorthand for a phrase with a single exact hit.
    pub fn exact(self, phrase: &str, id: &str, label: &str) -> Self {
        self.phrase(phrase, ResultsBuilder::new().exact(id, label).build())
    }

    pub fn build(self) -> HashMap<String, SearchResults> {
        self.entries
    }

    pub fn backend(self) -> Arc<FixtureBackend> {
        Arc::new(FixtureBackend::new(self.entries))
    }
}

// ---------------------------------------------------------------------------
// Transformer wiring
// ---------------------------------------------------------------------------

/// A transformer over `backend` with caching disabled.
pub fn uncached_transformer(backend: Arc<dyn SearchBackend>) -> Transformer {
    Transformer::new(LookupClient::new(backend, Arc::new(DisabledCache)))
}

pub fn cached_transformer(
    backend: Arc<dyn SearchBackend>,
    cache: Arc<dyn LookupCache>,
) -> Transformer {
    Transformer::new(LookupClient::new(backend, cache))
}

pub fn transformer_with_timeout(backend: Arc<dyn SearchBackend>, timeout: Duration) -> Transformer {
    Transformer::new(LookupClient::new(backend, Arc::new(DisabledCache)).with_timeout(timeout))
}
