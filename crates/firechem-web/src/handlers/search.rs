//! Compound search: local dataset first, then the PubChem resolver.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use firechem_common::error::Classify;
use firechem_common::{Locale, Message, SearchMatch};
use firechem_sources::ResolveError;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::assembler::SearchResponse;
use crate::error::{ApiError, ErrorBody};
use crate::handlers::request_locale;
use crate::state::{AppState, SharedState};

/// Shorter queries are rejected before any lookup.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub locale: Option<String>,
}

/// POST /api/search
pub async fn search_post(
    State(state): State<SharedState>,
    headers: HeaderMap,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(req)) => {
            let locale = request_locale(req.locale.as_deref(), &headers);
            run_search(&state, req.query.as_deref(), locale).await
        }
        Err(rejection) => {
            ApiError::from_json_rejection(rejection, request_locale(None, &headers)).into_response()
        }
    }
}

/// GET /api/search?q=
pub async fn search_get(
    State(state): State<SharedState>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Response {
    match params {
        Ok(Query(params)) => {
            let locale = request_locale(params.locale.as_deref(), &headers);
            run_search(&state, params.q.as_deref(), locale).await
        }
        Err(rejection) => {
            ApiError::from_query_rejection(rejection, request_locale(None, &headers)).into_response()
        }
    }
}

/// Validate, look up and render. Misses answer 200 with `success: false`.
pub(crate) async fn run_search(state: &AppState, query: Option<&str>, locale: Locale) -> Response {
    let query = query.map(str::trim).unwrap_or_default();
    if query.chars().count() < MIN_QUERY_CHARS {
        return ApiError::validation(Message::QueryTooShort, locale).into_response();
    }

    match find_compound(state, query).await {
        Ok(found) => {
            info!(query, source = found.source(), "Compound found");
            Json(SearchResponse::from(found)).into_response()
        }
        Err(err) => Json(ErrorBody::new(
            err.kind(),
            Message::NotFound(query.to_string()).render(locale),
        ))
        .into_response(),
    }
}

#[instrument(skip(state))]
pub async fn find_compound(state: &AppState, query: &str) -> Result<SearchMatch, ResolveError> {
    if let Some(chem) = state.db.search_local(query) {
        return Ok(SearchMatch::Local(chem.clone()));
    }
    state.resolver.resolve(query).await.map(SearchMatch::Registry)
}
