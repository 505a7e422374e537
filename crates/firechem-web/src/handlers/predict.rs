//! Compatibility assessment plus optional reaction prediction for a pair.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use firechem_common::error::Classify;
use firechem_common::{CompatibilityInfo, CustomChemical, Locale, Message, Reactant};
use serde::Deserialize;
use tracing::{info, warn};

use crate::assembler::{assemble, PredictParts, PredictionOutcome, PredictionResponse};
use crate::error::ApiError;
use crate::handlers::request_locale;
use crate::handlers::search::run_search;
use crate::state::{AppState, SharedState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// `"search"` routes the request to compound search.
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub smiles1: Option<String>,
    #[serde(default)]
    pub smiles2: Option<String>,
    #[serde(default)]
    pub chem1_custom: Option<CustomChemical>,
    #[serde(default)]
    pub chem2_custom: Option<CustomChemical>,
    #[serde(default)]
    pub locale: Option<String>,
}

/// POST /api/predict
pub async fn predict(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return ApiError::from_json_rejection(rejection, request_locale(None, &headers))
                .into_response()
        }
    };
    let locale = request_locale(req.locale.as_deref(), &headers);

    if req.action.as_deref() == Some("search") {
        return run_search(&state, req.query.as_deref(), locale).await;
    }

    match predict_pair(&state, req, locale).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn predict_pair(
    state: &AppState,
    req: PredictRequest,
    locale: Locale,
) -> Result<PredictionResponse, ApiError> {
    let smiles1 = req.smiles1.as_deref().map(str::trim).unwrap_or_default();
    let smiles2 = req.smiles2.as_deref().map(str::trim).unwrap_or_default();
    if smiles1.is_empty() || smiles2.is_empty() {
        return Err(ApiError::validation(Message::MissingStructures, locale));
    }

    let chem1 = Reactant::resolve(state.db.find_chemical(smiles1), req.chem1_custom);
    let chem2 = Reactant::resolve(state.db.find_chemical(smiles2), req.chem2_custom);
    let category1 = Reactant::category_or_unknown(chem1.as_ref());
    let category2 = Reactant::category_or_unknown(chem2.as_ref());

    let compatibility = state
        .db
        .find_compatibility(category1, category2)
        .map(CompatibilityInfo::from);
    let is_organic = state.gate.allows_prediction(category1, category2);
    info!(
        category1,
        category2,
        has_rule = compatibility.is_some(),
        is_organic,
        "Assessing pair"
    );

    let outcome = if !is_organic {
        PredictionOutcome::NotApplicable
    } else {
        match &state.predictor {
            None => PredictionOutcome::Disabled,
            Some(predictor) => match predictor.predict(smiles1, smiles2).await {
                Ok(prediction) => PredictionOutcome::Predicted(prediction),
                Err(err) => {
                    warn!(kind = %err.kind(), error = %err, "Reaction prediction failed");
                    PredictionOutcome::Failed(err)
                }
            },
        }
    };

    Ok(assemble(
        PredictParts {
            smiles1,
            smiles2,
            chem1,
            chem2,
            compatibility,
            is_organic,
            outcome,
        },
        state.max_alternates,
        locale,
    ))
}
