//! Picker data.

use axum::extract::State;
use axum::Json;
use firechem_common::Chemical;

use crate::state::SharedState;

/// GET /api/chemicals — the static dataset in file order.
pub async fn list_chemicals(State(state): State<SharedState>) -> Json<Vec<Chemical>> {
    Json(state.db.chemicals().to_vec())
}
