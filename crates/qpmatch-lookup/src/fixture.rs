//! Offline backend that answers from a JSON fixture.
//!
//! The fixture is an object mapping a phrase to its hit lists:
//!
//! ```json
//! {
//!   "Barack Obama": { "exact": [{ "id": "Q76", "label": "Barack Obama" }] },
//!   "born":         { "exact": [{ "id": "P569", "label": "date of birth" }] }
//! }
//! ```
//!
//! Phrases match case-insensitively. Hits not admitted by the requested kind
//! filter are dropped, and each list is cut to the requested limit.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use qpmatch_core::{KindFilter, LookupError, SearchBackend, SearchResults};

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("could not read fixture {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("fixture is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct FixtureBackend {
    entries: HashMap<String, SearchResults>,
    calls: AtomicUsize,
}

impl FixtureBackend {
    pub fn new(entries: HashMap<String, SearchResults>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(phrase, results)| (phrase.to_lowercase(), results))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, FixtureError> {
        let entries: HashMap<String, SearchResults> = serde_json::from_str(json)?;
        Ok(Self::new(entries))
    }

    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of searches served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SearchBackend for FixtureBackend {
    async fn search(
        &self,
        phrase: &str,
        _language: &str,
        limit: usize,
        kind: KindFilter,
    ) -> Result<SearchResults, LookupError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let Some(found) = self.entries.get(&phrase.to_lowercase()) else {
            return Ok(SearchResults::default());
        };
        let mut results = found.clone().restrict_to(kind);
        results.exact.truncate(limit);
        results.fuzzy.truncate(limit);
        Ok(results)
    }
}
