//! Wikidata `wbsearchentities` backend.
//!
//! Entities are searched with `type=item` and relations with `type=property`;
//! [`KindFilter::Both`] issues both requests concurrently and lists items
//! before properties. A hit is exact when its label or the text it matched on
//! equals the phrase case-insensitively.

use async_trait::async_trait;
use serde::Deserialize;

use qpmatch_core::{Hit, KindFilter, LookupError, SearchBackend, SearchResults};

pub const DEFAULT_ENDPOINT: &str = "https://www.wikidata.org/w/api.php";

#[derive(Debug, thiserror::Error)]
pub enum WikidataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Wikidata returned HTTP {0}")]
    Status(u16),
    #[error("Wikidata API error {code}: {info}")]
    Api { code: String, info: String },
}

impl From<WikidataError> for LookupError {
    fn from(e: WikidataError) -> Self {
        match e {
            WikidataError::Status(status) => LookupError::Status { status },
            WikidataError::Http(e) if e.is_decode() => LookupError::Decode(e.to_string()),
            WikidataError::Http(e) if e.is_timeout() => {
                LookupError::Backend(format!("timed out: {e}"))
            }
            other => LookupError::Backend(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    search: Vec<SearchEntry>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    id: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "match", default)]
    matched: Option<MatchInfo>,
}

#[derive(Debug, Deserialize)]
struct MatchInfo {
    #[serde(default)]
    text: String,
}

impl SearchEntry {
    fn is_exact(&self, phrase: &str) -> bool {
        let label_matches = self
            .label
            .as_deref()
            .is_some_and(|l| l.to_lowercase() == phrase.to_lowercase());
        let text_matches = self
            .matched
            .as_ref()
            .is_some_and(|m| m.text.to_lowercase() == phrase.to_lowercase());
        label_matches || text_matches
    }

    fn into_hit(self) -> Hit {
        Hit {
            label: self.label.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WikidataBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl WikidataBackend {
    pub fn new(endpoint: impl Into<String>, user_agent: &str) -> Result<Self, WikidataError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn search_type(
        &self,
        phrase: &str,
        language: &str,
        limit: usize,
        entity_type: &str,
    ) -> Result<Vec<SearchEntry>, WikidataError> {
        let limit = limit.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "wbsearchentities"),
                ("search", phrase),
                ("language", language),
                ("uselang", language),
                ("type", entity_type),
                ("limit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WikidataError::Status(resp.status().as_u16()));
        }

        let body: SearchResponse = resp.json().await?;
        if let Some(err) = body.error {
            return Err(WikidataError::Api {
                code: err.code,
                info: err.info,
            });
        }
        Ok(body.search)
    }
}

#[async_trait]
impl SearchBackend for WikidataBackend {
    async fn search(
        &self,
        phrase: &str,
        language: &str,
        limit: usize,
        kind: KindFilter,
    ) -> Result<SearchResults, LookupError> {
        let entries = match kind {
            KindFilter::Entity => self.search_type(phrase, language, limit, "item").await?,
            KindFilter::Relation => self.search_type(phrase, language, limit, "property").await?,
            KindFilter::Both => {
                let (mut items, properties) = tokio::try_join!(
                    self.search_type(phrase, language, limit, "item"),
                    self.search_type(phrase, language, limit, "property"),
                )?;
                items.extend(properties);
                items
            }
        };

        let mut results = SearchResults::default();
        for entry in entries {
            if entry.is_exact(phrase) {
                results.exact.push(entry.into_hit());
            } else {
                results.fuzzy.push(entry.into_hit());
            }
        }
        tracing::debug!(
            phrase,
            %kind,
            exact = results.exact.len(),
            fuzzy = results.fuzzy.len(),
            "wikidata search"
        );
        Ok(results)
    }
}
