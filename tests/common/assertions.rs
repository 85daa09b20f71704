//! Domain-specific assertion macros for qpmatch harnesses.
//!
//! These add context-rich failure messages that make it clear *which*
//! sequence invariant was violated and on *what* input.

// ---------------------------------------------------------------------------
// Sequence assertions
// ---------------------------------------------------------------------------

/// Assert that a `Transformation` rendered to exactly `expected`.
///
/// ```rust
/// assert_formatted!(result, "Q76 P569");
/// ```
#[macro_export]
macro_rules! assert_formatted {
    ($result:expr, $expected:expr) => {{
        let result: &qpmatch::Transformation = &$result;
        let expected: &str = $expected;
        if result.formatted != expected {
            panic!(
                "assert_formatted! failed for input {:?}:\n  expected: {:?}\n  actual:   {:?}\n  items:    {:?}",
                result.original,
                expected,
                result.formatted,
                result
                    .sequence
                    .iter()
                    .map(|i| (&i.span.text, &i.id))
                    .collect::<Vec<_>>()
            );
        }
    }};
}

/// Assert that no two items of a `Transformation` cover the same token.
#[macro_export]
macro_rules! assert_non_overlapping {
    ($result:expr) => {{
        let result: &qpmatch::Transformation = &$result;
        let items = &result.sequence;
        for (i, a) in items.iter().enumerate() {
            for b in items.iter().skip(i + 1) {
                if a.span.overlaps(&b.span) {
                    panic!(
                        "assert_non_overlapping! failed for input {:?}:\n  {:?} [{}..={}] overlaps {:?} [{}..={}]",
                        result.original,
                        a.span.text,
                        a.span.start,
                        a.span.end,
                        b.span.text,
                        b.span.start,
                        b.span.end
                    );
                }
            }
        }
    }};
}

/// Assert that items appear in ascending token order.
#[macro_export]
macro_rules! assert_reading_order {
    ($result:expr) => {{
        let result: &qpmatch::Transformation = &$result;
        let starts: Vec<usize> = result.sequence.iter().map(|i| i.span.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        if starts != sorted {
            panic!(
                "assert_reading_order! failed for input {:?}: span starts {:?}",
                result.original, starts
            );
        }
    }};
}

// ---------------------------------------------------------------------------
// Item assertions
// ---------------------------------------------------------------------------

/// Assert that the sequence contains an item matched from `span_text` with
/// the given id.
#[macro_export]
macro_rules! assert_item {
    ($result:expr, $span_text:expr, $id:expr) => {{
        let result: &qpmatch::Transformation = &$result;
        let span_text: &str = $span_text;
        let id: &str = $id;
        match result.sequence.iter().find(|i| i.span.text == span_text) {
            Some(item) if item.id == id => {}
            Some(item) => panic!(
                "assert_item! failed: span {:?}\n  expected id: {:?}\n  actual id:   {:?}",
                span_text, id, item.id
            ),
            None => panic!(
                "assert_item! failed: no item for span {:?}.\n  Matched spans: {:?}",
                span_text,
                result
                    .sequence
                    .iter()
                    .map(|i| &i.span.text)
                    .collect::<Vec<_>>()
            ),
        }
    }};
}
