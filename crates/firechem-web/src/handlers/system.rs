//! Liveness and configuration summary.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::state::SharedState;

/// GET /api/health
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let mut non_organic: Vec<&str> = state.gate.categories().collect();
    non_organic.sort_unstable();

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "chemicals": state.db.chemicals().len(),
        "rules": state.db.rules().len(),
        "categories": state.db.categories().len(),
        "predictor": state.predictor_mode(),
        "nonOrganicCategories": non_organic,
        "uptimeSecs": (Utc::now() - state.started_at).num_seconds(),
    }))
}
