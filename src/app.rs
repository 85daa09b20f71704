//! Wiring from [`Config`] to a ready [`Transformer`].

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use qpmatch_core::config::Config;
use qpmatch_core::cache::CacheEntry;
use qpmatch_core::{open_cache, LookupCache, LookupClient, SearchBackend, Transformer};
use qpmatch_lookup::{FixtureBackend, WikidataBackend};

/// The Wikidata backend from `[lookup]`, or an offline fixture when given.
pub fn build_backend(
    config: &Config,
    fixture: Option<&Path>,
) -> anyhow::Result<Arc<dyn SearchBackend>> {
    match fixture {
        Some(path) => {
            let backend = FixtureBackend::from_path(path)?;
            tracing::info!(
                path = %path.display(),
                phrases = backend.len(),
                "using fixture backend"
            );
            Ok(Arc::new(backend))
        }
        None => {
            let backend = WikidataBackend::new(&config.lookup.endpoint, &config.lookup.user_agent)
                .context("building Wikidata HTTP client")?;
            Ok(Arc::new(backend))
        }
    }
}

pub fn build_cache(config: &Config) -> anyhow::Result<Arc<dyn LookupCache>> {
    let options = config.cache.cache_options();
    open_cache(&options).with_context(|| {
        format!(
            "opening {:?} cache in {}",
            options.backend,
            options.directory.display()
        )
    })
}

pub fn build_transformer(
    config: &Config,
    backend: Arc<dyn SearchBackend>,
    cache: Arc<dyn LookupCache>,
) -> Transformer {
    let client = LookupClient::new(backend, cache)
        .with_timeout(config.lookup.timeout())
        .with_language(config.engine.language.clone());
    Transformer::with_lexicon(client, config.lexicon.lexicon())
}

/// Write every valid durable record to `path` as a JSON array.
pub async fn export_cache(cache: &dyn LookupCache, path: &Path) -> anyhow::Result<usize> {
    let entries = cache.export().await;
    let body = serde_json::to_vec_pretty(&entries)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("writing cache export to {}", path.display()))?;
    Ok(entries.len())
}

/// Load a file written by [`export_cache`] and replay it into `cache`.
pub async fn import_cache(cache: &dyn LookupCache, path: &Path) -> anyhow::Result<usize> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading cache export {}", path.display()))?;
    let entries: Vec<CacheEntry> = serde_json::from_slice(&raw)
        .with_context(|| format!("parsing cache export {}", path.display()))?;
    Ok(cache.import(entries).await)
}
