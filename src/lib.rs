//! qpmatch: text to Wikidata identifier sequences.
//!
//! Re-exports the engine ([`qpmatch_core`]) and the lookup backends
//! ([`qpmatch_lookup`]) so integration tests and embedding applications can
//! depend on one crate, and provides the wiring the CLI uses to build a
//! [`Transformer`] from a [`Config`].
//!
//! # Architecture
//!
//! ```text
//! text ──► Tokenizer ──► N-gram ──► Resolver ──► Matcher ──► Formatter ──► sequence
//!                                     │
//!                               LookupClient ──► LookupCache (memory → file | sqlite | none)
//!                                     │
//!                               SearchBackend (Wikidata | fixture)
//! ```

pub mod app;

pub use qpmatch_core::config::Config;
pub use qpmatch_core::{
    cache, engine, formatter, lexicon, lookup, matcher, ngram, resolver, tokenizer, types,
};
pub use qpmatch_core::{
    open_cache, CacheBackend, CacheEntry, CacheError, CacheOptions, CacheQuery, EngineError,
    LookupCache, LookupClient, LookupError, SearchBackend, SearchResults, TransformContext,
    TransformOptions, Transformation, Transformer,
};
pub use qpmatch_lookup::{FixtureBackend, WikidataBackend};
