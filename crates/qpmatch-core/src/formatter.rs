//! Candidate formatter and sequence rendering.
//!
//! A matched span's hits become either a single identifier or a bracketed
//! disambiguation set (`[Q782 or Q18094 or Q131750]`). The resulting items are
//! rendered as plain text, as HTML links, and as a low-confidence
//! single-path alternative.

use std::collections::HashSet;

use crate::types::{
    AlternativeSequence, CandidateHit, Confidence, HitKind, ItemKind, MatchType, MatchedItem, Span,
};

const ENTITY_PAGE: &str = "entities.html";
const PROPERTY_PAGE: &str = "properties.html";

/// Pick at most `max_candidates` hits: exact matches in their returned order,
/// then fuzzy ones, skipping ids already taken.
pub fn select_candidates(hits: &[CandidateHit], max_candidates: usize) -> Vec<CandidateHit> {
    let mut seen = HashSet::new();
    let exact = hits.iter().filter(|h| h.match_type == MatchType::Exact);
    let fuzzy = hits.iter().filter(|h| h.match_type == MatchType::Fuzzy);
    exact
        .chain(fuzzy)
        .filter(|h| seen.insert(h.id.as_str()))
        .take(max_candidates)
        .cloned()
        .collect()
}

fn bracketed<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    format!("[{}]", parts.collect::<Vec<_>>().join(" or "))
}

/// Build the [`MatchedItem`] for `span` from an already selected candidate
/// list. Returns `None` when there is nothing to emit.
pub fn format_candidates(
    span: Span,
    candidates: Vec<CandidateHit>,
    include_labels: bool,
) -> Option<MatchedItem> {
    match candidates.len() {
        0 => None,
        1 => {
            let only = candidates.into_iter().next()?;
            Some(MatchedItem {
                id: only.id,
                label: include_labels.then_some(only.label),
                kind: only.kind.into(),
                alternatives: Vec::new(),
                span,
            })
        }
        _ => Some(MatchedItem {
            id: bracketed(candidates.iter().map(|c| c.id.as_str())),
            label: include_labels.then(|| bracketed(candidates.iter().map(|c| c.label.as_str()))),
            kind: ItemKind::Ambiguous,
            alternatives: candidates,
            span,
        }),
    }
}

/// Select and format in one step. See [`select_candidates`].
pub fn format_item(
    span: Span,
    hits: &[CandidateHit],
    max_candidates: usize,
    include_labels: bool,
) -> Option<MatchedItem> {
    format_candidates(span, select_candidates(hits, max_candidates), include_labels)
}

/// Item ids joined by a single space.
pub fn format_sequence(items: &[MatchedItem]) -> String {
    items
        .iter()
        .map(|item| item.id.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn link(id: &str) -> String {
    let page = match HitKind::from_id(id) {
        HitKind::Property => PROPERTY_PAGE,
        HitKind::Entity => ENTITY_PAGE,
    };
    format!(r#"<a href="{page}#{id}" target="_blank">{id}</a>"#)
}

/// Like [`format_sequence`] with every id wrapped in a link to its entity or
/// property page.
pub fn format_sequence_with_links(items: &[MatchedItem]) -> String {
    items
        .iter()
        .map(|item| {
            if item.is_ambiguous() {
                let links: Vec<String> = item.alternatives.iter().map(|c| link(&c.id)).collect();
                format!("[{}]", links.join(" or "))
            } else {
                link(&item.id)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One low-confidence reading that resolves every ambiguous item to its first
/// candidate. Empty when nothing is ambiguous.
pub fn generate_alternatives(items: &[MatchedItem]) -> Vec<AlternativeSequence> {
    if !items.iter().any(MatchedItem::is_ambiguous) {
        return Vec::new();
    }
    let sequence = items
        .iter()
        .map(|item| match item.alternatives.first() {
            Some(first) if item.is_ambiguous() => first.id.as_str(),
            _ => item.id.as_str(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    vec![AlternativeSequence {
        sequence,
        confidence: Confidence::Low,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn hit(id: &str, match_type: MatchType) -> CandidateHit {
        CandidateHit {
            id: id.to_string(),
            label: format!("L{id}"),
            description: None,
            kind: HitKind::from_id(id),
            match_type,
        }
    }

    fn span() -> Span {
        Span {
            start: 0,
            end: 0,
            text: "Hawaii".to_string(),
        }
    }

    #[test]
    fn cap_reached_by_exact_matches_excludes_fuzzy() {
        let hits = vec![
            hit("Q1", MatchType::Fuzzy),
            hit("Q10", MatchType::Exact),
            hit("Q11", MatchType::Exact),
            hit("Q2", MatchType::Fuzzy),
            hit("Q12", MatchType::Exact),
        ];
        let item = format_item(span(), &hits, 3, false).unwrap();
        assert_eq!(item.id, "[Q10 or Q11 or Q12]");
        assert_eq!(item.kind, ItemKind::Ambiguous);
        assert_eq!(item.alternatives.len(), 3);
        assert!(item.label.is_none());
    }

    #[test]
    fn duplicates_are_dropped_before_the_cap() {
        let hits = vec![
            hit("Q1", MatchType::Exact),
            hit("Q1", MatchType::Fuzzy),
            hit("Q2", MatchType::Fuzzy),
        ];
        let ids: Vec<_> = select_candidates(&hits, 3).into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["Q1", "Q2"]);
    }

    #[rstest]
    #[case::entity("Q76", ItemKind::Entity)]
    #[case::property("P569", ItemKind::Property)]
    fn single_candidate_is_unambiguous(#[case] id: &str, #[case] kind: ItemKind) {
        let item = format_item(span(), &[hit(id, MatchType::Exact)], 3, true).unwrap();
        assert_eq!(item.id, id);
        assert_eq!(item.kind, kind);
        assert_eq!(item.label.as_deref(), Some(format!("L{id}").as_str()));
        assert!(item.alternatives.is_empty());
    }

    #[test]
    fn no_candidates_drops_the_item() {
        assert!(format_item(span(), &[], 3, false).is_none());
        assert!(format_item(span(), &[hit("Q1", MatchType::Exact)], 0, false).is_none());
    }

    #[test]
    fn ambiguous_labels_follow_id_order() {
        let hits = vec![hit("Q1", MatchType::Exact), hit("Q2", MatchType::Fuzzy)];
        let item = format_item(span(), &hits, 3, true).unwrap();
        assert_eq!(item.label.as_deref(), Some("[LQ1 or LQ2]"));
    }

    #[test]
    fn renders_plain_linked_and_alternative_sequences() {
        let single = format_item(span(), &[hit("Q76", MatchType::Exact)], 3, false).unwrap();
        let relation = format_item(span(), &[hit("P569", MatchType::Exact)], 3, false).unwrap();
        let ambiguous = format_item(
            span(),
            &[hit("Q782", MatchType::Exact), hit("Q18094", MatchType::Fuzzy)],
            3,
            false,
        )
        .unwrap();
        let items = vec![single, relation, ambiguous];

        assert_eq!(format_sequence(&items), "Q76 P569 [Q782 or Q18094]");
        assert_eq!(
            format_sequence_with_links(&items),
            concat!(
                r#"<a href="entities.html#Q76" target="_blank">Q76</a> "#,
                r#"<a href="properties.html#P569" target="_blank">P569</a> "#,
                r#"[<a href="entities.html#Q782" target="_blank">Q782</a> or "#,
                r#"<a href="entities.html#Q18094" target="_blank">Q18094</a>]"#,
            )
        );

        let alternatives = generate_alternatives(&items);
        assert_eq!(alternatives.len(), 1);
        assert_eq!(alternatives[0].sequence, "Q76 P569 Q782");
        assert_eq!(alternatives[0].confidence, Confidence::Low);

        assert!(generate_alternatives(&items[..2]).is_empty());
    }
}
