//! Shared test utilities for qpmatch integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Backends here are deterministic and safe to use with
//! `tokio::time::pause()`; the durable cache tiers are not, since they touch
//! the filesystem from the blocking pool.

pub mod assertions;
pub mod builders;
pub mod fake_backend;
pub mod fake_wikidata_api;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fake_backend::*;
pub use fixtures::*;
