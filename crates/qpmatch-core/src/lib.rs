//! qpmatch-core: phrase-matching engine and lookup cache.
//!
//! Turns free-form text into an ordered sequence of knowledge-base
//! identifiers (`Q…` entities, `P…` properties), with bracketed
//! disambiguation sets where a phrase does not resolve to one id.
//!
//! # Architecture
//!
//! ```text
//! text ──► Tokenizer ──► N-gram ──► Resolver ──► Matcher ──► Formatter
//!                                     │
//!                               LookupClient ──► LookupCache (memory → durable)
//!                                     │
//!                               SearchBackend
//! ```
//!
//! Every stage except the resolver is synchronous and pure. The resolver
//! issues all lookups for one call concurrently and joins on them.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod lexicon;
pub mod lookup;
pub mod matcher;
pub mod ngram;
pub mod resolver;
pub mod tokenizer;
pub mod types;

pub use cache::{
    open_cache, CacheBackend, CacheEntry, CacheOptions, CacheQuery, CacheStats, LookupCache,
};
pub use engine::{TransformContext, TransformOptions, Transformer};
pub use error::{CacheError, EngineError, LookupError};
pub use lexicon::Lexicon;
pub use lookup::{LookupClient, SearchBackend, SearchResults};
pub use types::{
    CandidateHit, Hit, HitKind, ItemKind, KindFilter, MatchType, MatchedItem, Span, Token,
    Transformation,
};
