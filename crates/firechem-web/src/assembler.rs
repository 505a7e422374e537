//! Builds the caller-facing payloads from lookup, gate and upstream results.
//!
//! Partial data always survives: compatibility and reactant echoes are
//! returned even when prediction was skipped or failed. Prediction fields
//! appear only for organic pairs with a successful prediction.

use firechem_common::error::Classify;
use firechem_common::{
    Chemical, CompatibilityInfo, ErrorKind, Locale, Message, Prediction, Reactant,
    RegistryCompound, SearchMatch, UNKNOWN_CATEGORY,
};
use firechem_common::entities::UNKNOWN_CATEGORY_HE;
use firechem_sources::PredictorError;
use serde::Serialize;
use serde_json::Value;

/// What happened to the prediction step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Predicted,
    /// Both reactants are in non-organic categories.
    NotApplicable,
    /// Prediction switched off in configuration.
    Disabled,
    Failed,
    Timeout,
}

/// Result of the prediction step handed to [`assemble`].
#[derive(Debug)]
pub enum PredictionOutcome {
    Predicted(Prediction),
    NotApplicable,
    Disabled,
    Failed(PredictorError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reactants {
    pub chem1: Option<Reactant>,
    pub chem2: Option<Reactant>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub smiles: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub success: bool,
    pub compatibility: Option<CompatibilityInfo>,
    pub is_organic: bool,
    pub reactants: Reactants,
    pub prediction_status: PredictionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Percent, one decimal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction_smiles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_predictions: Option<Vec<RankedCandidate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_info: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

/// Everything the predict path gathered before assembly.
pub struct PredictParts<'a> {
    pub smiles1: &'a str,
    pub smiles2: &'a str,
    pub chem1: Option<Reactant>,
    pub chem2: Option<Reactant>,
    pub compatibility: Option<CompatibilityInfo>,
    pub is_organic: bool,
    pub outcome: PredictionOutcome,
}

pub fn assemble(parts: PredictParts<'_>, max_alternates: usize, locale: Locale) -> PredictionResponse {
    let mut response = PredictionResponse {
        success: true,
        compatibility: parts.compatibility,
        is_organic: parts.is_organic,
        reactants: Reactants { chem1: parts.chem1, chem2: parts.chem2 },
        prediction_status: PredictionStatus::NotApplicable,
        product: None,
        confidence: None,
        reaction_smiles: None,
        all_predictions: None,
        product_info: None,
        error: None,
        error_kind: None,
    };

    // The gate decides, whatever the predictor said.
    if !parts.is_organic {
        return response;
    }

    match parts.outcome {
        PredictionOutcome::Predicted(prediction) => {
            let top = prediction.top();
            response.prediction_status = PredictionStatus::Predicted;
            response.product = Some(top.smiles.clone());
            response.confidence = Some(top.confidence_percent());
            response.reaction_smiles = Some(
                prediction
                    .reaction_smiles
                    .clone()
                    .unwrap_or_else(|| format!("{}.{}>>{}", parts.smiles1, parts.smiles2, top.smiles)),
            );
            response.all_predictions = Some(
                prediction
                    .ranked(max_alternates)
                    .iter()
                    .enumerate()
                    .map(|(i, c)| RankedCandidate {
                        rank: i + 1,
                        smiles: c.smiles.clone(),
                        confidence: c.confidence_percent(),
                    })
                    .collect(),
            );
            response.product_info = prediction.product_info.clone();
        }
        PredictionOutcome::NotApplicable => {}
        PredictionOutcome::Disabled => {
            response.prediction_status = PredictionStatus::Disabled;
            response.error = Some(Message::PredictorUnavailable.render(locale));
            response.error_kind = Some(ErrorKind::Transport);
        }
        PredictionOutcome::Failed(err) => {
            let kind = err.kind();
            response.prediction_status = if kind == ErrorKind::Timeout {
                PredictionStatus::Timeout
            } else {
                PredictionStatus::Failed
            };
            response.error = Some(predictor_message(&err).render(locale));
            response.error_kind = Some(kind);
        }
    }
    response
}

fn predictor_message(err: &PredictorError) -> Message {
    match err {
        PredictorError::Unauthorized(_) => Message::PredictorRejected,
        e if e.kind() == ErrorKind::Timeout => Message::PredictionTimeout,
        e if e.kind() == ErrorKind::Transport => Message::PredictorUnavailable,
        _ => Message::NoProduct,
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub success: bool,
    pub source: &'static str,
    pub name: Option<String>,
    #[serde(rename = "name_he")]
    pub name_he: Option<String>,
    pub formula: Option<String>,
    pub cas: Option<String>,
    pub smiles: String,
    #[serde(rename = "category_en")]
    pub category_en: String,
    #[serde(rename = "category_he")]
    pub category_he: String,
    pub hazards: Vec<String>,
    pub pubchem_url: Option<String>,
    pub cid: Option<u64>,
}

impl From<SearchMatch> for SearchResponse {
    fn from(found: SearchMatch) -> Self {
        let source = found.source();
        match found {
            SearchMatch::Local(chem) => Self::local(source, chem),
            SearchMatch::Registry(compound) => Self::registry(source, compound),
        }
    }
}

impl SearchResponse {
    fn local(source: &'static str, chem: Chemical) -> Self {
        Self {
            success: true,
            source,
            name: Some(chem.name_en),
            name_he: Some(chem.name_he),
            formula: Some(chem.formula),
            cas: Some(chem.cas),
            smiles: chem.smiles,
            category_en: chem.category_en,
            category_he: chem.category_he,
            hazards: chem.hazards,
            pubchem_url: None,
            cid: None,
        }
    }

    fn registry(source: &'static str, compound: RegistryCompound) -> Self {
        Self {
            success: true,
            source,
            name: compound.name,
            name_he: None,
            formula: compound.formula,
            cas: compound.cas,
            smiles: compound.smiles,
            category_en: UNKNOWN_CATEGORY.to_string(),
            category_he: UNKNOWN_CATEGORY_HE.to_string(),
            hazards: Vec::new(),
            pubchem_url: Some(compound.url),
            cid: Some(compound.cid),
        }
    }
}
