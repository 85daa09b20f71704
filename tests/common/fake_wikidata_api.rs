//! Fake Wikidata search API for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves `GET /w/api.php?action=wbsearchentities&...` with the
//! same response shape as the real API:
//!
//! ```json
//! { "search": [ { "id": "Q76", "label": "Barack Obama", "match": { "text": "Barack Obama" } } ] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! let api = FakeWikidataApi::start().await.unwrap();
//! api.add("item", "Barack Obama", "Q76", "Barack Obama", None).await;
//!
//! // Point a WikidataBackend at api.endpoint()
//! let backend = WikidataBackend::new(api.endpoint(), "qpmatch-tests").unwrap();
//! ```

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// State shared between the router and test code.
#[derive(Default)]
struct ApiState {
    /// `(type, lowercased search)` → search entries.
    entries: HashMap<(String, String), Vec<serde_json::Value>>,
    /// When set, every request is answered with this status.
    fail_with: Option<u16>,
    /// When set, every request gets an API-level error body.
    api_error: Option<String>,
    /// Query strings of every request received, in order.
    requests: Vec<HashMap<String, String>>,
}

/// Handle to the running fake Wikidata API server.
pub struct FakeWikidataApi {
    addr: SocketAddr,
    state: Arc<Mutex<ApiState>>,
}

impl FakeWikidataApi {
    /// Start the server on a random port. Returns once it is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(ApiState::default()));

        let app = Router::new()
            .route("/w/api.php", get(search_entities))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full endpoint URL to hand to `WikidataBackend::new`.
    pub fn endpoint(&self) -> String {
        format!("{}/w/api.php", self.base_url())
    }

    /// Register a search entry. `entity_type` is `item` or `property`; the
    /// entry's `match.text` is its label.
    pub async fn add(
        &self,
        entity_type: &str,
        search: &str,
        id: &str,
        label: &str,
        description: Option<&str>,
    ) {
        let mut entry = serde_json::json!({
            "id": id,
            "label": label,
            "match": { "type": "label", "language": "en", "text": label }
        });
        if let Some(description) = description {
            entry["description"] = serde_json::json!(description);
        }
        let mut state = self.state.lock().await;
        state
            .entries
            .entry((entity_type.to_string(), search.to_lowercase()))
            .or_default()
            .push(entry);
    }

    /// Answer every subsequent request with `status`.
    pub async fn fail_with(&self, status: u16) {
        self.state.lock().await.fail_with = Some(status);
    }

    /// Answer every subsequent request with a 200 carrying an API error.
    pub async fn api_error(&self, code: &str) {
        self.state.lock().await.api_error = Some(code.to_string());
    }

    pub async fn requests(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().await.requests.clone()
    }

    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

async fn search_entities(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<Arc<Mutex<ApiState>>>,
) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.requests.push(params.clone());

    if let Some(status) = state.fail_with {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(serde_json::json!({})));
    }
    if let Some(code) = &state.api_error {
        return (
            StatusCode::OK,
            Json(serde_json::json!({
                "error": { "code": code, "info": "scripted API error" }
            })),
        );
    }
    if params.get("action").map(String::as_str) != Some("wbsearchentities") {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": { "code": "badaction", "info": "" } })),
        );
    }

    let entity_type = params.get("type").cloned().unwrap_or_else(|| "item".to_string());
    let search = params.get("search").map(|s| s.to_lowercase()).unwrap_or_default();
    let limit: usize = params
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(7);

    let hits: Vec<serde_json::Value> = state
        .entries
        .get(&(entity_type, search))
        .map(|entries| entries.iter().take(limit).cloned().collect())
        .unwrap_or_default();

    (StatusCode::OK, Json(serde_json::json!({ "search": hits })))
}
