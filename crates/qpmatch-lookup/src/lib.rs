//! qpmatch-lookup: lookup backends for qpmatch.
//!
//! Each backend implements [`qpmatch_core::SearchBackend`]: given a phrase,
//! a language, a result limit and a kind filter, return exact and fuzzy hits.

pub mod fixture;
pub mod wikidata;

pub use fixture::{FixtureBackend, FixtureError};
pub use wikidata::{WikidataBackend, WikidataError};
