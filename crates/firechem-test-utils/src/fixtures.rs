//! Canned upstream payloads in the shapes PubChem and the Gradio app send.

use serde_json::{json, Value};

/// App-level prediction payload as produced by the inference service.
pub fn prediction_payload(candidates: &[(&str, f64)]) -> Value {
    let top = candidates.first();
    json!({
        "success": true,
        "product": top.map(|(s, _)| *s),
        "confidence": top.map(|(_, c)| *c),
        "allPredictions": candidates
            .iter()
            .map(|(smiles, confidence)| json!({"smiles": smiles, "confidence": confidence}))
            .collect::<Vec<_>>(),
    })
}

/// Gradio call-API stream: heartbeat, then a `complete` event carrying the
/// payload JSON-encoded inside a one-element array.
pub fn gradio_stream(payload: &Value) -> String {
    let data = json!([payload.to_string()]);
    format!("event: heartbeat\ndata: null\n\nevent: complete\ndata: {data}\n\n")
}

pub fn gradio_error_stream() -> String {
    "event: error\ndata: null\n\n".to_string()
}

pub fn pubchem_cids(cids: &[u64]) -> Value {
    json!({ "IdentifierList": { "CID": cids } })
}

pub fn pubchem_properties(cid: u64, smiles: &str, title: &str, formula: &str) -> Value {
    json!({
        "PropertyTable": {
            "Properties": [{
                "CID": cid,
                "ConnectivitySMILES": smiles,
                "MolecularFormula": formula,
                "IUPACName": title.to_lowercase(),
                "Title": title,
            }]
        }
    })
}

pub fn pubchem_synonyms(cid: u64, synonyms: &[&str]) -> Value {
    json!({
        "InformationList": {
            "Information": [{ "CID": cid, "Synonym": synonyms }]
        }
    })
}

/// PubChem's 404 body for unknown names.
pub fn pubchem_not_found() -> Value {
    json!({
        "Fault": {
            "Code": "PUGREST.NotFound",
            "Message": "No CID found",
        }
    })
}
