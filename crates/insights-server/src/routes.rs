use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use insights_analytics::Insights;
use insights_core::filters::{DateRange, FilterCriteria, NumericRange};
use insights_core::store::LoadOutcome;
use insights_core::types::{CallStatus, CallType};
use serde::Deserialize;

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Conversations ───────────────────────────────────────────────────────

pub fn conversation_routes() -> Router<AppState> {
    Router::new().route("/api/conversations", get(list_conversations))
}

async fn list_conversations(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.read().await;
    Json(store.conversations().to_vec())
}

// ── Insights ────────────────────────────────────────────────────────────

pub fn insights_routes() -> Router<AppState> {
    Router::new().route("/api/insights", get(insights))
}

/// Filter criteria as query parameters. An empty `agent` means unset.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsQuery {
    agent: Option<String>,
    call_type: Option<CallType>,
    status: Option<CallStatus>,
    start: Option<i64>,
    end: Option<i64>,
    min_duration: Option<f64>,
    max_duration: Option<f64>,
    min_cost: Option<f64>,
    max_cost: Option<f64>,
}

impl InsightsQuery {
    pub fn into_criteria(self) -> FilterCriteria {
        FilterCriteria {
            date_range: DateRange::new(self.start, self.end),
            agent: self.agent.filter(|a| !a.is_empty()),
            call_type: self.call_type,
            status: self.status,
            duration_range: NumericRange::new(self.min_duration, self.max_duration),
            cost_range: NumericRange::new(self.min_cost, self.max_cost),
        }
    }
}

async fn insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> impl IntoResponse {
    let criteria = query.into_criteria();
    for issue in criteria.issues() {
        tracing::warn!("Insights query: {}", issue);
    }

    let store = state.store.read().await;
    Json(Insights::new(store.conversations(), &criteria).snapshot())
}

// ── Reload ──────────────────────────────────────────────────────────────

pub fn reload_routes() -> Router<AppState> {
    Router::new().route("/api/reload", post(reload))
}

async fn reload(State(state): State<AppState>) -> impl IntoResponse {
    let outcome = state.reload().await;
    let count = state.store.read().await.conversations().len();
    let outcome = match outcome {
        LoadOutcome::Replaced { .. } => "replaced",
        LoadOutcome::Failed => "failed",
        LoadOutcome::Stale => "stale",
    };
    Json(serde_json::json!({
        "outcome": outcome,
        "count": count,
    }))
}
