/// Core entity types shared by the lookup, client and web layers.
/// Static records mirror the JSON dataset files under `data/`.

use serde::{Deserialize, Serialize};

/// Category reported when neither the dataset nor the caller supplies one.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Hebrew display label for [`UNKNOWN_CATEGORY`].
pub const UNKNOWN_CATEGORY_HE: &str = "לא ידוע";

// ---------------------------------------------------------------------------
// Chemical
// ---------------------------------------------------------------------------

/// A known chemical from the static dataset, keyed by SMILES.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chemical {
    pub smiles: String,
    pub name_en: String,
    pub name_he: String,
    pub formula: String,
    pub cas: String,
    pub category_en: String,
    pub category_he: String,
    #[serde(default)]
    pub hazards: Vec<String>,
}

/// Chemical details supplied by the caller for substances missing from the
/// dataset (typically the output of an earlier registry search).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomChemical {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smiles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_he: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_he: Option<String>,
    pub hazards: Vec<String>,
}

// ---------------------------------------------------------------------------
// Reactant
// ---------------------------------------------------------------------------

/// One side of a predict request: either a dataset record or whatever the
/// caller told us about a substance we don't know.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Reactant {
    Local(Chemical),
    CallerSupplied(CustomChemical),
}

impl Reactant {
    /// Dataset record wins over caller-supplied details. A record without a
    /// category borrows the caller's.
    pub fn resolve(local: Option<&Chemical>, custom: Option<CustomChemical>) -> Option<Self> {
        match (local, custom) {
            (Some(chem), custom) => {
                let mut chem = chem.clone();
                if chem.category_en.trim().is_empty() {
                    if let Some(custom) = custom.filter(|c| {
                        c.category_en.as_deref().is_some_and(|cat| !cat.trim().is_empty())
                    }) {
                        chem.category_en = custom.category_en.unwrap_or_default();
                        if chem.category_he.trim().is_empty() {
                            chem.category_he = custom.category_he.unwrap_or_default();
                        }
                    }
                }
                Some(Reactant::Local(chem))
            }
            (None, Some(custom)) => Some(Reactant::CallerSupplied(custom)),
            (None, None) => None,
        }
    }

    /// English category tag, if one is known.
    pub fn category(&self) -> Option<&str> {
        match self {
            Reactant::Local(chem) => Some(chem.category_en.as_str()).filter(|c| !c.is_empty()),
            Reactant::CallerSupplied(custom) => {
                custom.category_en.as_deref().filter(|c| !c.is_empty())
            }
        }
    }

    /// Category used for rule lookup and gating; falls back to [`UNKNOWN_CATEGORY`].
    pub fn category_or_unknown(reactant: Option<&Reactant>) -> &str {
        reactant
            .and_then(Reactant::category)
            .unwrap_or(UNKNOWN_CATEGORY)
    }
}

// ---------------------------------------------------------------------------
// Compatibility rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardLevel {
    #[serde(alias = "safe")]
    Compatible,
    #[serde(alias = "warning")]
    Caution,
    #[serde(alias = "danger")]
    Incompatible,
}

/// Rule for an unordered pair of categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityRule {
    pub group1: String,
    pub group2: String,
    pub level: HazardLevel,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub hazards_he: Vec<String>,
    #[serde(default)]
    pub hazards_en: Vec<String>,
    #[serde(default)]
    pub description_he: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub gases: Vec<String>,
}

impl CompatibilityRule {
    /// Symmetric match over the unordered pair.
    pub fn pairs_with(&self, a: &str, b: &str) -> bool {
        (self.group1 == a && self.group2 == b) || (self.group1 == b && self.group2 == a)
    }
}

/// The part of a rule echoed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityInfo {
    pub level: HazardLevel,
    pub icon: String,
    pub hazards_he: Vec<String>,
    pub hazards_en: Vec<String>,
    pub description_he: String,
    pub description_en: String,
    pub gases: Vec<String>,
}

impl From<&CompatibilityRule> for CompatibilityInfo {
    fn from(rule: &CompatibilityRule) -> Self {
        Self {
            level: rule.level,
            icon: rule.icon.clone(),
            hazards_he: rule.hazards_he.clone(),
            hazards_en: rule.hazards_en.clone(),
            description_he: rule.description_he.clone(),
            description_en: rule.description_en.clone(),
            gases: rule.gases.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Compound assembled from the PubChem lookups. Absent fields stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryCompound {
    pub cid: u64,
    pub name: Option<String>,
    pub formula: Option<String>,
    pub cas: Option<String>,
    pub smiles: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchMatch {
    Local(Chemical),
    Registry(RegistryCompound),
}

impl SearchMatch {
    /// Provenance tag reported to callers.
    pub fn source(&self) -> &'static str {
        match self {
            SearchMatch::Local(_) => "local",
            SearchMatch::Registry(_) => "pubchem",
        }
    }
}

// ---------------------------------------------------------------------------
// Prediction
// ---------------------------------------------------------------------------

/// One predicted product. `confidence` is a fraction in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub smiles: String,
    pub confidence: f64,
}

impl Candidate {
    /// Confidence as a display percentage with one decimal.
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence.clamp(0.0, 1.0) * 1000.0).round() / 10.0
    }
}

/// Successful predictor outcome. Candidates are ranked best first and never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    candidates: Vec<Candidate>,
    pub reaction_smiles: Option<String>,
    pub product_info: Option<serde_json::Value>,
}

impl Prediction {
    /// Returns `None` when there is nothing to rank.
    pub fn new(mut candidates: Vec<Candidate>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Some(Self {
            candidates,
            reaction_smiles: None,
            product_info: None,
        })
    }

    pub fn with_reaction_smiles(mut self, reaction: Option<String>) -> Self {
        self.reaction_smiles = reaction;
        self
    }

    pub fn with_product_info(mut self, info: Option<serde_json::Value>) -> Self {
        self.product_info = info;
        self
    }

    pub fn top(&self) -> &Candidate {
        &self.candidates[0]
    }

    /// The ranked list, top candidate included, cut to `limit` entries.
    pub fn ranked(&self, limit: usize) -> &[Candidate] {
        &self.candidates[..self.candidates.len().min(limit)]
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}
