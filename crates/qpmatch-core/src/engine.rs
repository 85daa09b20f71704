//! Engine entrypoint: text → tokens → spans → lookups → selection → sequence.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::formatter;
use crate::lexicon::Lexicon;
use crate::lookup::LookupClient;
use crate::matcher;
use crate::ngram;
use crate::resolver;
use crate::tokenizer::tokenize;
use crate::types::{MatchedItem, Transformation};

/// Longest span the engine will consider.
pub const MAX_SPAN_SIZE_CAP: usize = 6;
/// Largest per-lookup result count accepted by the search API.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Per-call options for [`Transformer::transform`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Cap on candidates kept per ambiguous match.
    pub max_candidates: usize,
    pub include_labels: bool,
    /// Hits requested per lookup.
    pub search_limit: usize,
    /// Look every span up as a relation.
    pub prefer_properties: bool,
    pub max_span_size: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            max_candidates: 3,
            include_labels: false,
            search_limit: 10,
            prefer_properties: false,
            max_span_size: 3,
        }
    }
}

impl TransformOptions {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_candidates == 0 {
            return Err(EngineError::InvalidOption {
                name: "max_candidates",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(1..=MAX_SEARCH_LIMIT).contains(&self.search_limit) {
            return Err(EngineError::InvalidOption {
                name: "search_limit",
                reason: format!(
                    "must be between 1 and {MAX_SEARCH_LIMIT}, got {}",
                    self.search_limit
                ),
            });
        }
        if !(1..=MAX_SPAN_SIZE_CAP).contains(&self.max_span_size) {
            return Err(EngineError::InvalidOption {
                name: "max_span_size",
                reason: format!(
                    "must be between 1 and {MAX_SPAN_SIZE_CAP}, got {}",
                    self.max_span_size
                ),
            });
        }
        Ok(())
    }
}

/// Extra hints for [`Transformer::transform_with_context`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformContext {
    /// Keep only ambiguous alternatives whose description mentions this.
    pub domain: Option<String>,
}

pub struct Transformer {
    client: LookupClient,
    lexicon: Lexicon,
}

impl Transformer {
    pub fn new(client: LookupClient) -> Self {
        Self::with_lexicon(client, Lexicon::default())
    }

    pub fn with_lexicon(client: LookupClient, lexicon: Lexicon) -> Self {
        Self { client, lexicon }
    }

    pub fn client(&self) -> &LookupClient {
        &self.client
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Turn `text` into an ordered identifier sequence.
    ///
    /// Only invalid options are an error. Failed lookups and unmatched text
    /// simply produce a shorter (possibly empty) sequence.
    pub async fn transform(
        &self,
        text: &str,
        options: &TransformOptions,
    ) -> Result<Transformation, EngineError> {
        options.validate()?;

        let tokens = tokenize(text);
        let spans = ngram::generate(&tokens, options.max_span_size, &self.lexicon).into_flat();
        tracing::debug!(tokens = tokens.len(), spans = spans.len(), "generated candidate spans");

        let resolved = resolver::resolve(
            &self.client,
            spans,
            options.search_limit,
            options.prefer_properties,
            &self.lexicon,
        )
        .await;

        let sequence: Vec<MatchedItem> = matcher::select(resolved)
            .into_iter()
            .filter_map(|r| {
                formatter::format_item(
                    r.span,
                    &r.hits,
                    options.max_candidates,
                    options.include_labels,
                )
            })
            .collect();

        Ok(assemble(text, tokens, sequence))
    }

    /// [`transform`](Self::transform), then narrow ambiguous items to the
    /// alternatives whose description mentions `context.domain`. An item whose
    /// alternatives would all be filtered out is left as it was.
    pub async fn transform_with_context(
        &self,
        text: &str,
        context: &TransformContext,
        options: &TransformOptions,
    ) -> Result<Transformation, EngineError> {
        let result = self.transform(text, options).await?;
        let Some(domain) = context.domain.as_deref().map(str::to_lowercase) else {
            return Ok(result);
        };
        if domain.is_empty() {
            return Ok(result);
        }

        let sequence = result
            .sequence
            .into_iter()
            .map(|item| narrow_to_domain(item, &domain, options.include_labels))
            .collect();
        Ok(assemble(&result.original, result.tokens, sequence))
    }
}

fn narrow_to_domain(item: MatchedItem, domain: &str, include_labels: bool) -> MatchedItem {
    if !item.is_ambiguous() {
        return item;
    }
    let survivors: Vec<_> = item
        .alternatives
        .iter()
        .filter(|c| {
            c.description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(domain))
        })
        .cloned()
        .collect();
    if survivors.is_empty() {
        return item;
    }
    let span = item.span.clone();
    formatter::format_candidates(span, survivors, include_labels).unwrap_or(item)
}

fn assemble(
    original: &str,
    tokens: Vec<crate::types::Token>,
    sequence: Vec<MatchedItem>,
) -> Transformation {
    Transformation {
        original: original.to_string(),
        tokens,
        formatted: formatter::format_sequence(&sequence),
        formatted_with_links: formatter::format_sequence_with_links(&sequence),
        alternatives: formatter::generate_alternatives(&sequence),
        sequence,
    }
}
