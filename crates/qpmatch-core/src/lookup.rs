//! Lookup client: serves a phrase search from the cache or the backend.
//!
//! [`SearchBackend`] is the only capability the engine needs from the outside
//! world. [`LookupClient`] wraps one with a [`LookupCache`] and a per-call
//! timeout, and composes the raw exact/fuzzy result sets into a
//! deduplicated, match-type-tagged candidate list.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cache::{CacheQuery, LookupCache};
use crate::error::LookupError;
use crate::types::{CandidateHit, Hit, HitKind, KindFilter, MatchType};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_LANGUAGE: &str = "en";

/// Raw result of a single backend search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub exact: Vec<Hit>,
    #[serde(default)]
    pub fuzzy: Vec<Hit>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.fuzzy.is_empty()
    }

    /// Drop hits whose id prefix is not admitted by `kind`.
    pub fn restrict_to(mut self, kind: KindFilter) -> Self {
        self.exact.retain(|h| kind.admits(HitKind::from_id(&h.id)));
        self.fuzzy.retain(|h| kind.admits(HitKind::from_id(&h.id)));
        self
    }

    /// Merge both sets into one candidate list: exact hits first in their
    /// returned order, then fuzzy hits, each id kept once.
    pub fn into_candidates(self) -> Vec<CandidateHit> {
        let mut seen = HashSet::new();
        let exact = self.exact.into_iter().map(|h| (h, MatchType::Exact));
        let fuzzy = self.fuzzy.into_iter().map(|h| (h, MatchType::Fuzzy));
        exact
            .chain(fuzzy)
            .filter(|(h, _)| seen.insert(h.id.clone()))
            .map(|(h, m)| CandidateHit::from_hit(h, m))
            .collect()
    }
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Search for exact and fuzzy matches of `phrase`, restricted by `kind`.
    async fn search(
        &self,
        phrase: &str,
        language: &str,
        limit: usize,
        kind: KindFilter,
    ) -> Result<SearchResults, LookupError>;
}

/// Cache-fronted access to a [`SearchBackend`].
#[derive(Clone)]
pub struct LookupClient {
    backend: Arc<dyn SearchBackend>,
    cache: Arc<dyn LookupCache>,
    timeout: Duration,
    language: String,
    ttl: Option<Duration>,
}

impl LookupClient {
    pub fn new(backend: Arc<dyn SearchBackend>, cache: Arc<dyn LookupCache>) -> Self {
        Self {
            backend,
            cache,
            timeout: DEFAULT_TIMEOUT,
            language: DEFAULT_LANGUAGE.to_string(),
            ttl: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// TTL for entries written by this client; `None` uses the cache default.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn cache(&self) -> &Arc<dyn LookupCache> {
        &self.cache
    }

    /// Search for `phrase`, serving from the cache when possible.
    ///
    /// Only successful backend responses are cached (including empty ones).
    /// A backend call that outlives the client's timeout fails with
    /// [`LookupError::Timeout`].
    pub async fn search_span(
        &self,
        phrase: &str,
        kind: KindFilter,
        limit: usize,
    ) -> Result<SearchResults, LookupError> {
        let query = CacheQuery {
            query: phrase,
            language: &self.language,
            limit,
            kind,
        };

        if let Some(payload) = self.cache.get(&query).await {
            match serde_json::from_value::<SearchResults>(payload) {
                Ok(results) => return Ok(results),
                Err(e) => tracing::warn!(phrase, "ignoring undecodable cache payload: {e}"),
            }
        }

        let results = tokio::time::timeout(
            self.timeout,
            self.backend.search(phrase, &self.language, limit, kind),
        )
        .await
        .map_err(|_| LookupError::Timeout(self.timeout))??
        .restrict_to(kind);

        tracing::debug!(
            phrase,
            %kind,
            exact = results.exact.len(),
            fuzzy = results.fuzzy.len(),
            "backend search"
        );

        match serde_json::to_value(&results) {
            Ok(payload) => self.cache.set(&query, payload, self.ttl).await,
            Err(e) => tracing::warn!(phrase, "could not encode lookup result for cache: {e}"),
        }
        Ok(results)
    }

    /// Exact and fuzzy hits for `phrase`, merged and tagged. See
    /// [`SearchResults::into_candidates`].
    pub async fn disambiguation_search(
        &self,
        phrase: &str,
        kind: KindFilter,
        limit: usize,
    ) -> Result<Vec<CandidateHit>, LookupError> {
        Ok(self.search_span(phrase, kind, limit).await?.into_candidates())
    }
}
