//! Priority matcher: greedy, longest-first, non-overlapping span selection.
//!
//! Spans are visited by size descending, then start ascending. A span is
//! accepted only if none of its token indices has been consumed by an earlier
//! acceptance. The accepted spans are returned in reading order.

use crate::resolver::ResolvedSpan;

pub fn select(mut resolved: Vec<ResolvedSpan>) -> Vec<ResolvedSpan> {
    resolved.sort_by(|a, b| {
        b.span
            .size()
            .cmp(&a.span.size())
            .then(a.span.start.cmp(&b.span.start))
    });

    let width = resolved.iter().map(|r| r.span.end + 1).max().unwrap_or(0);
    let mut consumed = vec![false; width];
    let mut accepted = Vec::new();

    for candidate in resolved {
        if candidate.span.indices().any(|i| consumed[i]) {
            continue;
        }
        for i in candidate.span.indices() {
            consumed[i] = true;
        }
        accepted.push(candidate);
    }

    accepted.sort_by_key(|r| r.span.start);
    accepted
}
