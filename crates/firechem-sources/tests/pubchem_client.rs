//! PubChem client against an in-process mock of the PUG REST endpoints.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use firechem_common::error::Classify;
use firechem_common::ErrorKind;
use firechem_sources::pubchem::Step;
use firechem_sources::{CompoundResolver, PubChemClient, ResolveError};
use firechem_test_utils::fixtures::{
    pubchem_cids, pubchem_not_found, pubchem_properties, pubchem_synonyms,
};
use firechem_test_utils::MockServer;
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct Hits {
    synonyms: Arc<AtomicUsize>,
}

async fn cids(Path(query): Path<String>) -> impl IntoResponse {
    match query.as_str() {
        "aspirin" | "50-78-2" => (StatusCode::OK, Json(pubchem_cids(&[2244]))).into_response(),
        "salt" => (StatusCode::OK, Json(pubchem_cids(&[5234, 24884]))).into_response(),
        "empty" => (StatusCode::OK, Json(pubchem_cids(&[]))).into_response(),
        "no smiles" => (StatusCode::OK, Json(pubchem_cids(&[7]))).into_response(),
        "broken synonyms" => (StatusCode::OK, Json(pubchem_cids(&[8]))).into_response(),
        "html" => (StatusCode::OK, "<html>maintenance</html>").into_response(),
        _ => (StatusCode::NOT_FOUND, Json(pubchem_not_found())).into_response(),
    }
}

async fn properties(Path((cid, _props)): Path<(u64, String)>) -> impl IntoResponse {
    match cid {
        2244 => Json(pubchem_properties(2244, "CC(=O)OC1=CC=CC=C1C(=O)O", "Aspirin", "C9H8O4")).into_response(),
        8 => Json(pubchem_properties(8, "C", "Methane", "CH4")).into_response(),
        7 => Json(serde_json::json!({"PropertyTable": {"Properties": [{"CID": 7}]}})).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn synonyms(State(hits): State<Hits>, Path(cid): Path<u64>) -> impl IntoResponse {
    hits.synonyms.fetch_add(1, Ordering::SeqCst);
    match cid {
        2244 => Json(pubchem_synonyms(2244, &["aspirin", "ACETYLSALICYLIC ACID", "50-78-2"])).into_response(),
        _ => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

async fn start() -> (MockServer, Hits, PubChemClient) {
    let hits = Hits::default();
    let router = Router::new()
        .route("/rest/pug/compound/name/{query}/cids/JSON", get(cids))
        .route("/rest/pug/compound/cid/{cid}/property/{props}/JSON", get(properties))
        .route("/rest/pug/compound/cid/{cid}/synonyms/JSON", get(synonyms))
        .with_state(hits.clone());
    let server = MockServer::start(router).await;
    let client = PubChemClient::new(&server.url("/rest/pug"), Duration::from_secs(5)).unwrap();
    (server, hits, client)
}

#[tokio::test]
async fn test_resolves_name_through_three_calls() {
    let (_server, hits, client) = start().await;

    let compound = client.resolve("  aspirin ").await.unwrap();

    assert_eq!(compound.cid, 2244);
    assert_eq!(compound.smiles, "CC(=O)OC1=CC=CC=C1C(=O)O");
    assert_eq!(compound.formula.as_deref(), Some("C9H8O4"));
    assert_eq!(compound.cas.as_deref(), Some("50-78-2"));
    assert_eq!(compound.name.as_deref(), Some("aspirin"));
    assert_eq!(compound.url, "https://pubchem.ncbi.nlm.nih.gov/compound/2244");
    assert_eq!(hits.synonyms.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_resolves_cas_number() {
    let (_server, _hits, client) = start().await;
    let compound = client.resolve("50-78-2").await.unwrap();
    assert_eq!(compound.cid, 2244);
}

#[tokio::test]
async fn test_unknown_name_is_not_found_without_further_calls() {
    let (_server, hits, client) = start().await;

    let err = client.resolve("unobtainium").await.unwrap_err();
    assert!(matches!(err, ResolveError::NoIdentifier(ref q) if q == "unobtainium"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(hits.synonyms.load(Ordering::SeqCst), 0);

    let err = client.resolve("empty").await.unwrap_err();
    assert!(matches!(err, ResolveError::NoIdentifier(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_ambiguous_name_is_not_found() {
    let (_server, hits, client) = start().await;

    let err = client.resolve("salt").await.unwrap_err();

    assert!(matches!(err, ResolveError::NoIdentifier(ref q) if q == "salt"));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(hits.synonyms.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_structure_aborts() {
    let (_server, hits, client) = start().await;
    let err = client.resolve("no smiles").await.unwrap_err();
    assert!(matches!(err, ResolveError::NoStructure(7)));
    assert_eq!(hits.synonyms.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_failed_synonym_step_discards_partial_record() {
    let (_server, hits, client) = start().await;
    let err = client.resolve("broken synonyms").await.unwrap_err();
    assert!(matches!(err, ResolveError::Status { step: Step::Synonyms, status: 503 }));
    assert_eq!(hits.synonyms.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_non_json_body_is_tolerated() {
    let (_server, _hits, client) = start().await;
    let err = client.resolve("html").await.unwrap_err();
    assert!(matches!(err, ResolveError::Malformed { step: Step::NameToCid, .. }));
}

#[tokio::test]
async fn test_unreachable_registry_is_transport_error() {
    let client = PubChemClient::new("http://127.0.0.1:9/rest/pug", Duration::from_secs(2)).unwrap();
    let err = client.resolve("aspirin").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}
