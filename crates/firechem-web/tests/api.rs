//! Router tests driven through `tower::ServiceExt::oneshot` with scripted
//! upstreams.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use firechem_common::{OrganicGate, RegistryCompound};
use firechem_db::ChemicalDb;
use firechem_sources::ReactionPredictor;
use firechem_test_utils::{MockOutcome, MockPredictor, MockResolver};
use firechem_web::router::build_router;
use firechem_web::state::AppState;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

struct Harness {
    predictor: Arc<MockPredictor>,
    resolver: Arc<MockResolver>,
    router: Router,
}

fn harness(outcome: MockOutcome) -> Harness {
    let predictor = Arc::new(MockPredictor::new(outcome));
    let resolver = Arc::new(MockResolver::new().with(
        "aspirin",
        RegistryCompound {
            cid: 2244,
            name: Some("Aspirin".to_string()),
            formula: Some("C9H8O4".to_string()),
            cas: Some("50-78-2".to_string()),
            smiles: "CC(=O)OC1=CC=CC=C1C(=O)O".to_string(),
            url: "https://pubchem.ncbi.nlm.nih.gov/compound/2244".to_string(),
        },
    ));
    let dyn_predictor: Arc<dyn ReactionPredictor> = predictor.clone();
    let state = AppState::new(
        Arc::new(ChemicalDb::builtin().unwrap()),
        OrganicGate::default(),
        Some(dyn_predictor),
        resolver.clone(),
    );
    Harness { predictor, resolver, router: build_router(state) }
}

fn ready() -> MockOutcome {
    MockOutcome::ready(&[("CCOC(C)=O", 0.873), ("CC(=O)OC(C)=O", 0.05)])
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    call(router, Method::POST, uri, Some(body)).await
}

// ── predict ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_organic_pair_is_predicted() {
    let h = harness(ready());

    let (status, body) = post(&h.router, "/api/predict", json!({"smiles1": "CCO", "smiles2": "CC(=O)O"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["isOrganic"], true);
    assert_eq!(body["predictionStatus"], "predicted");
    assert_eq!(body["product"], "CCOC(C)=O");
    assert_eq!(body["confidence"], 87.3);
    assert_eq!(body["reactionSmiles"], "CCO.CC(=O)O>>CCOC(C)=O");
    assert_eq!(body["allPredictions"][1]["rank"], 2);
    assert_eq!(body["compatibility"]["level"], "compatible");
    assert_eq!(body["reactants"]["chem1"]["source"], "local");
    assert_eq!(body["reactants"]["chem1"]["name_en"], "Ethanol");
    assert_eq!(h.predictor.calls(), vec![("CCO".to_string(), "CC(=O)O".to_string())]);
}

#[tokio::test]
async fn test_inorganic_pair_skips_predictor() {
    let h = harness(ready());

    let (status, body) = post(
        &h.router,
        "/api/predict",
        json!({"smiles1": "Cl", "smiles2": "[Na+].[OH-]"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOrganic"], false);
    assert_eq!(body["predictionStatus"], "not_applicable");
    assert_eq!(body["compatibility"]["level"], "caution");
    assert!(body.get("product").is_none());
    assert!(body.get("confidence").is_none());
    assert!(body.get("allPredictions").is_none());
    assert_eq!(h.predictor.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_reactants_use_caller_details() {
    let h = harness(ready());

    let (_, body) = post(
        &h.router,
        "/api/predict",
        json!({
            "smiles1": "CC(=O)OC1=CC=CC=C1C(=O)O",
            "smiles2": "O",
            "chem1Custom": {"name_en": "Aspirin", "category_en": "Unknown"},
        }),
    )
    .await;

    assert_eq!(body["reactants"]["chem1"]["source"], "caller_supplied");
    assert_eq!(body["reactants"]["chem1"]["name_en"], "Aspirin");
    assert_eq!(body["reactants"]["chem2"]["name_en"], "Water");
    assert_eq!(body["isOrganic"], true);
    assert_eq!(body["compatibility"], Value::Null);
    assert_eq!(h.predictor.call_count(), 1);
}

#[tokio::test]
async fn test_predictor_timeout_keeps_compatibility() {
    let h = harness(MockOutcome::Timeout(15));

    let (status, body) = post(
        &h.router,
        "/api/predict",
        json!({"smiles1": "CCO", "smiles2": "[Na]", "locale": "en"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["predictionStatus"], "timeout");
    assert_eq!(body["errorKind"], "timeout");
    assert_eq!(body["error"], "The prediction service did not answer in time, try again");
    assert_eq!(body["compatibility"]["level"], "incompatible");
    assert_eq!(body["compatibility"]["gases"], json!(["H2"]));
    assert!(body.get("product").is_none());
}

#[tokio::test]
async fn test_upstream_failure_is_classified() {
    let h = harness(MockOutcome::Status(502));
    let (_, body) = post(&h.router, "/api/predict", json!({"smiles1": "CCO", "smiles2": "CC=O"})).await;
    assert_eq!(body["predictionStatus"], "failed");
    assert_eq!(body["errorKind"], "transport");

    let h = harness(MockOutcome::Upstream("model crashed".to_string()));
    let (_, body) = post(&h.router, "/api/predict", json!({"smiles1": "CCO", "smiles2": "CC=O"})).await;
    assert_eq!(body["errorKind"], "upstream");
}

#[tokio::test]
async fn test_repeated_requests_give_identical_compatibility() {
    let h = harness(ready());
    let req = json!({"smiles1": "CC(C)=O", "smiles2": "OO"});

    let (_, first) = post(&h.router, "/api/predict", req.clone()).await;
    let (_, second) = post(&h.router, "/api/predict", req).await;

    assert_eq!(first["compatibility"], second["compatibility"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_smiles_is_validation_error() {
    let h = harness(ready());

    let (status, body) = post(&h.router, "/api/predict", json!({"smiles1": "CCO", "smiles2": "  ", "locale": "en"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "SMILES for both substances are required",
            "errorKind": "validation",
        })
    );
    assert_eq!(h.predictor.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let h = harness(ready());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = h.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["errorKind"], "validation");
    assert_eq!(body["success"], false);
}

// ── search ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_search_local_by_name_cas_formula_and_hebrew() {
    let h = harness(ready());

    for query in ["ethanol", "64-17-5", "c2h6o", "אתנול"] {
        let (status, body) = post(&h.router, "/api/search", json!({"query": query})).await;
        assert_eq!(status, StatusCode::OK, "query {query}");
        assert_eq!(body["source"], "local", "query {query}");
        assert_eq!(body["smiles"], "CCO");
        assert_eq!(body["category_en"], "Alcohols");
        assert_eq!(body["category_he"], "כהלים");
    }
    assert_eq!(h.resolver.call_count(), 0);
}

#[tokio::test]
async fn test_search_falls_back_to_registry() {
    let h = harness(ready());

    let (status, body) = call(&h.router, Method::GET, "/api/search?q=Aspirin", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["source"], "pubchem");
    assert_eq!(body["cid"], 2244);
    assert_eq!(body["category_en"], "Unknown");
    assert_eq!(body["hazards"], json!([]));
    assert_eq!(h.resolver.call_count(), 1);
}

#[tokio::test]
async fn test_search_miss_is_not_found() {
    let h = harness(ready());

    let (status, body) = post(&h.router, "/api/search", json!({"query": "unobtainium", "locale": "en"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "No substance found: unobtainium",
            "errorKind": "not_found",
        })
    );
}

#[tokio::test]
async fn test_short_query_is_rejected_without_lookup() {
    let h = harness(ready());

    let (status, body) = post(&h.router, "/api/search", json!({"query": " a "})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorKind"], "validation");
    assert_eq!(h.resolver.call_count(), 0);
}

#[tokio::test]
async fn test_predict_route_accepts_search_action() {
    let h = harness(ready());

    let (status, body) = post(&h.router, "/api/predict", json!({"action": "search", "query": "acetone"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "local");
    assert_eq!(body["smiles"], "CC(C)=O");
    assert_eq!(h.predictor.call_count(), 0);
}

// ── misc ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_chemicals_and_health() {
    let h = harness(ready());

    let (status, chemicals) = call(&h.router, Method::GET, "/api/chemicals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(chemicals.as_array().unwrap().len(), 35);
    assert_eq!(chemicals[0]["smiles"], "Cl");

    let (status, health) = call(&h.router, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["chemicals"], 35);
    assert_eq!(health["predictor"], "mock");
}

#[tokio::test]
async fn test_disabled_predictor_reports_status() {
    let state = AppState::new(
        Arc::new(ChemicalDb::builtin().unwrap()),
        OrganicGate::default(),
        None,
        Arc::new(MockResolver::new()),
    );
    let router = build_router(state);

    let (_, body) = post(&router, "/api/predict", json!({"smiles1": "CCO", "smiles2": "CC(C)=O"})).await;

    assert_eq!(body["predictionStatus"], "disabled");
    assert_eq!(body["isOrganic"], true);
    assert!(body.get("product").is_none());
}
