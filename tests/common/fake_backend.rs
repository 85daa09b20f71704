//! Scripted in-process lookup backend.
//!
//! Each phrase can be told to answer, fail, or answer after a delay. Every
//! call is recorded with its kind filter so harnesses can assert on call
//! counts and on the heuristic that chose the filter.
//!
//! ```rust
//! let backend = ScriptedBackend::new()
//!     .answer("Barack Obama", ResultsBuilder::new().exact("Q76", "Barack Obama").build())
//!     .fail("Hawaii")
//!     .delay("born", Duration::from_secs(30), SearchResults::default());
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use qpmatch::types::KindFilter;
use qpmatch::{LookupError, SearchBackend, SearchResults};

#[derive(Clone)]
enum Script {
    Answer(SearchResults),
    Fail,
    Delay(Duration, SearchResults),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub phrase: String,
    pub kind: KindFilter,
    pub limit: usize,
}

#[derive(Default)]
pub struct ScriptedBackend {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every entry of a corpus as an immediate answer.
    pub fn with_corpus(mut self, corpus: HashMap<String, SearchResults>) -> Self {
        for (phrase, results) in corpus {
            self.scripts.insert(phrase, Script::Answer(results));
        }
        self
    }

    pub fn answer(mut self, phrase: &str, results: SearchResults) -> Self {
        self.scripts.insert(phrase.to_string(), Script::Answer(results));
        self
    }

    pub fn fail(mut self, phrase: &str) -> Self {
        self.scripts.insert(phrase.to_string(), Script::Fail);
        self
    }

    pub fn delay(mut self, phrase: &str, delay: Duration, results: SearchResults) -> Self {
        self.scripts
            .insert(phrase.to_string(), Script::Delay(delay, results));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, phrase: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.phrase == phrase)
            .collect()
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search(
        &self,
        phrase: &str,
        _language: &str,
        limit: usize,
        kind: KindFilter,
    ) -> Result<SearchResults, LookupError> {
        self.calls.lock().unwrap().push(RecordedCall {
            phrase: phrase.to_string(),
            kind,
            limit,
        });

        match self.scripts.get(phrase).cloned() {
            None => Ok(SearchResults::default()),
            Some(Script::Answer(results)) => Ok(results),
            Some(Script::Fail) => Err(LookupError::Backend(format!("scripted failure for {phrase:?}"))),
            Some(Script::Delay(delay, results)) => {
                tokio::time::sleep(delay).await;
                Ok(results)
            }
        }
    }
}
