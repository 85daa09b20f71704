//! Parallel candidate resolver.
//!
//! Issues one lookup per candidate span, all concurrently, and waits for every
//! one to finish. A failed or timed-out lookup counts as zero hits; only spans
//! with at least one hit survive.

use futures::future::join_all;

use crate::lexicon::Lexicon;
use crate::lookup::LookupClient;
use crate::types::{CandidateHit, KindFilter, Span};

/// A span that returned at least one hit, with the merged candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpan {
    pub span: Span,
    pub hits: Vec<CandidateHit>,
}

/// Kind filter for a span: relations when the caller asked for them or the
/// text contains a relation indicator, otherwise both kinds.
pub fn kind_filter_for(text: &str, prefer_properties: bool, lexicon: &Lexicon) -> KindFilter {
    if prefer_properties || lexicon.suggests_relation(text) {
        KindFilter::Relation
    } else {
        KindFilter::Both
    }
}

pub async fn resolve(
    client: &LookupClient,
    spans: Vec<Span>,
    search_limit: usize,
    prefer_properties: bool,
    lexicon: &Lexicon,
) -> Vec<ResolvedSpan> {
    let lookups = spans.into_iter().map(|span| async move {
        let kind = kind_filter_for(&span.text, prefer_properties, lexicon);
        match client
            .disambiguation_search(&span.text, kind, search_limit)
            .await
        {
            Ok(hits) => ResolvedSpan { span, hits },
            Err(e) => {
                tracing::warn!(
                    phrase = %span.text,
                    %kind,
                    "lookup failed, treating as no match: {e}"
                );
                ResolvedSpan {
                    span,
                    hits: Vec::new(),
                }
            }
        }
    });

    join_all(lookups)
        .await
        .into_iter()
        .filter(|r| !r.hits.is_empty())
        .collect()
}
