//! Normalises whatever the prediction service sends back into ranked
//! candidates.
//!
//! Accepted shapes, possibly nested inside each other:
//!   - a JSON string holding JSON (Gradio wraps the app's output this way)
//!   - an array, of which the first element is the payload
//!   - `{"data": ...}` wrappers
//!   - the app payload itself:
//!     `{"success", "product", "confidence", "reactionSmiles",
//!       "allPredictions" | "predictions" | "candidates", "productInfo"}`
//!
//! Confidences above 1 are read as percentages.

use firechem_common::{Candidate, Prediction};
use serde_json::Value;

use crate::event_stream::parse_events;

/// What a single payload tells us about the job.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Ready(Prediction),
    /// Recognised but without candidates yet.
    Pending,
    /// The service reported a failure.
    Failed(String),
}

const CANDIDATE_KEYS: [&str; 3] = ["allPredictions", "predictions", "candidates"];
const FAILED_STATES: [&str; 3] = ["failed", "error", "cancelled"];

/// Decode a response body: JSON first, then an event stream whose last
/// event carrying candidates (or an error) wins. An empty event never
/// replaces an earlier result. `None` when nothing in the body is
/// recognisable.
pub fn decode_body(body: &str) -> Option<Decoded> {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return decode_payload(&value);
    }

    let mut last = None;
    for event in parse_events(body) {
        if event.is_error() {
            let reason = event
                .json()
                .and_then(|v| error_text(&v))
                .unwrap_or_else(|| "prediction service reported an error".to_string());
            last = Some(Decoded::Failed(reason));
            continue;
        }
        match event.json().as_ref().and_then(decode_payload) {
            Some(Decoded::Pending) => {
                if last.is_none() {
                    last = Some(Decoded::Pending);
                }
            }
            Some(decoded) => last = Some(decoded),
            None => {}
        }
    }
    last
}

pub fn decode_payload(value: &Value) -> Option<Decoded> {
    match value {
        Value::String(inner) => serde_json::from_str::<Value>(inner)
            .ok()
            .and_then(|v| decode_payload(&v)),
        Value::Array(items) => match items.first() {
            Some(first) => decode_payload(first),
            None => Some(Decoded::Pending),
        },
        Value::Object(map) => {
            if let Some(data) = map.get("data") {
                return decode_payload(data);
            }
            decode_object(value)
        }
        _ => None,
    }
}

fn decode_object(obj: &Value) -> Option<Decoded> {
    if obj["success"].as_bool() == Some(false) {
        return Some(Decoded::Failed(
            error_text(obj).unwrap_or_else(|| "prediction failed".to_string()),
        ));
    }
    if let Some(status) = obj["status"].as_str() {
        if FAILED_STATES.contains(&status.to_ascii_lowercase().as_str()) {
            return Some(Decoded::Failed(
                error_text(obj).unwrap_or_else(|| format!("job {status}")),
            ));
        }
    }

    let mut candidates: Vec<Candidate> = CANDIDATE_KEYS
        .iter()
        .find_map(|key| obj[*key].as_array())
        .map(|items| items.iter().filter_map(candidate_from).collect())
        .unwrap_or_default();

    if candidates.is_empty() {
        if let Some(product) = non_empty_str(&obj["product"]) {
            candidates.push(Candidate {
                smiles: product.to_string(),
                confidence: confidence_from(&obj["confidence"]),
            });
        }
    }

    let recognised = obj.get("success").is_some()
        || obj.get("status").is_some()
        || obj.get("product").is_some()
        || CANDIDATE_KEYS.iter().any(|k| obj.get(*k).is_some());
    if !recognised {
        return None;
    }

    match Prediction::new(candidates) {
        Some(prediction) => {
            let reaction = non_empty_str(&obj["reactionSmiles"])
                .or_else(|| non_empty_str(&obj["reaction_smiles"]))
                .map(String::from);
            let info = obj.get("productInfo").filter(|v| !v.is_null()).cloned();
            Some(Decoded::Ready(
                prediction.with_reaction_smiles(reaction).with_product_info(info),
            ))
        }
        None => Some(Decoded::Pending),
    }
}

fn candidate_from(item: &Value) -> Option<Candidate> {
    if let Some(smiles) = non_empty_str(item) {
        return Some(Candidate { smiles: smiles.to_string(), confidence: 0.0 });
    }
    let smiles = non_empty_str(&item["smiles"]).or_else(|| non_empty_str(&item["product"]))?;
    let confidence = ["confidence", "score", "probability"]
        .iter()
        .map(|k| &item[*k])
        .find(|v| !v.is_null())
        .map(confidence_from)
        .unwrap_or(0.0);
    Some(Candidate { smiles: smiles.to_string(), confidence })
}

/// Fraction in [0, 1]; numbers above 1 are percentages; strings may carry a `%`.
pub fn confidence_from(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(c) if c.is_finite() && c > 1.0 => (c / 100.0).min(1.0),
        Some(c) if c.is_finite() => c.max(0.0),
        _ => 0.0,
    }
}

fn error_text(value: &Value) -> Option<String> {
    ["error", "message", "detail"]
        .iter()
        .find_map(|k| non_empty_str(&value[*k]))
        .map(String::from)
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
