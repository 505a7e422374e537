//! PubChem PUG REST client.
//!
//! Resolves a free-text name or CAS number in three dependent calls:
//!   1. /compound/name/{query}/cids/JSON           → exactly one CID
//!   2. /compound/cid/{cid}/property/.../JSON       → SMILES, title, formula
//!   3. /compound/cid/{cid}/synonyms/JSON           → CAS number, friendlier name
//!
//! Any failing step aborts the whole resolution. Nothing is retried and no
//! partially filled record is ever returned.
//!
//! API docs: https://pubchem.ncbi.nlm.nih.gov/docs/pug-rest

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use firechem_common::error::Classify;
use firechem_common::{ErrorKind, RegistryCompound};
use firechem_config::PubchemConfig;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http::{build_client, snippet};

const COMPOUND_PAGE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/compound";
const PROPERTIES: &str = "CanonicalSMILES,SMILES,MolecularFormula,IUPACName,Title";
const SMILES_KEYS: [&str; 4] = ["CanonicalSMILES", "ConnectivitySMILES", "SMILES", "IsomericSMILES"];

/// Synonyms scanned for a CAS number.
const CAS_SCAN_LIMIT: usize = 50;
/// Synonyms scanned for a display name.
const NAME_SCAN_LIMIT: usize = 10;
const MAX_NAME_LEN: usize = 80;

lazy_static! {
    static ref CAS_RE: Regex = Regex::new(r"^\d{2,7}-\d{2}-\d$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    NameToCid,
    Properties,
    Synonyms,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::NameToCid => "name→CID",
            Step::Properties => "properties",
            Step::Synonyms => "synonyms",
        })
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("HTTP error during {step} lookup: {source}")]
    Http {
        step: Step,
        #[source]
        source: reqwest::Error,
    },
    #[error("{step} lookup returned status {status}")]
    Status { step: Step, status: u16 },
    #[error("{step} lookup returned a non-JSON body: {body}")]
    Malformed { step: Step, body: String },
    #[error("No compound identifier for '{0}'")]
    NoIdentifier(String),
    #[error("No structure for CID {0}")]
    NoStructure(u64),
    #[error("Cannot build PubChem URL from base '{0}'")]
    BaseUrl(String),
}

impl Classify for ResolveError {
    fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Http { .. } | ResolveError::Status { .. } => ErrorKind::Transport,
            ResolveError::Malformed { .. } => ErrorKind::Upstream,
            ResolveError::NoIdentifier(_) | ResolveError::NoStructure(_) => ErrorKind::NotFound,
            ResolveError::BaseUrl(_) => ErrorKind::Internal,
        }
    }
}

#[async_trait]
pub trait CompoundResolver: Send + Sync {
    async fn resolve(&self, query: &str) -> Result<RegistryCompound, ResolveError>;
}

/// PubChem client for compound resolution.
pub struct PubChemClient {
    client: Client,
    base_url: Url,
}

impl PubChemClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ResolveError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| ResolveError::BaseUrl(base_url.to_string()))?;
        let client = build_client(timeout).map_err(|source| ResolveError::Http {
            step: Step::NameToCid,
            source,
        })?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &PubchemConfig) -> Result<Self, ResolveError> {
        Self::new(&config.base_url, Duration::from_secs(config.request_timeout_secs))
    }

    /// Base URL with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, ResolveError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ResolveError::BaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, step: Step, url: Url) -> Result<Value, ResolveError> {
        debug!(%step, %url, "PubChem request");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ResolveError::Http { step, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ResolveError::Status { step, status: status.as_u16() });
        }

        let body = resp
            .text()
            .await
            .map_err(|source| ResolveError::Http { step, source })?;
        serde_json::from_str(&body).map_err(|_| ResolveError::Malformed {
            step,
            body: snippet(&body),
        })
    }

    #[instrument(skip(self))]
    async fn lookup_cid(&self, query: &str) -> Result<u64, ResolveError> {
        let url = self.url(&["compound", "name", query, "cids", "JSON"])?;
        // PubChem answers unknown names with 404 and a Fault body.
        let json = match self.get_json(Step::NameToCid, url).await {
            Err(ResolveError::Status { status: 404, .. }) => {
                return Err(ResolveError::NoIdentifier(query.to_string()))
            }
            other => other?,
        };
        single_cid(&json["IdentifierList"]["CID"])
            .ok_or_else(|| ResolveError::NoIdentifier(query.to_string()))
    }

    #[instrument(skip(self))]
    async fn fetch_properties(&self, cid: u64) -> Result<Properties, ResolveError> {
        let cid_str = cid.to_string();
        let url = self.url(&["compound", "cid", &cid_str, "property", PROPERTIES, "JSON"])?;
        let json = self.get_json(Step::Properties, url).await?;
        let props = &json["PropertyTable"]["Properties"][0];

        let smiles = SMILES_KEYS
            .iter()
            .find_map(|k| non_empty(&props[*k]))
            .ok_or(ResolveError::NoStructure(cid))?;

        Ok(Properties {
            smiles,
            name: non_empty(&props["Title"]).or_else(|| non_empty(&props["IUPACName"])),
            formula: non_empty(&props["MolecularFormula"]),
        })
    }

    #[instrument(skip(self))]
    async fn fetch_synonyms(&self, cid: u64) -> Result<Vec<String>, ResolveError> {
        let cid_str = cid.to_string();
        let url = self.url(&["compound", "cid", &cid_str, "synonyms", "JSON"])?;
        let json = self.get_json(Step::Synonyms, url).await?;
        Ok(json["InformationList"]["Information"][0]["Synonym"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|s| s.as_str().map(String::from)).collect())
            .unwrap_or_default())
    }
}

struct Properties {
    smiles: String,
    name: Option<String>,
    formula: Option<String>,
}

#[async_trait]
impl CompoundResolver for PubChemClient {
    async fn resolve(&self, query: &str) -> Result<RegistryCompound, ResolveError> {
        let query = query.trim();
        let result: Result<RegistryCompound, ResolveError> = async {
            let cid = self.lookup_cid(query).await?;
            let props = self.fetch_properties(cid).await?;
            let synonyms = self.fetch_synonyms(cid).await?;
            Ok(build_compound(cid, props, &synonyms))
        }
        .await;

        if let Err(e) = &result {
            warn!(query, kind = %e.kind(), error = %e, "PubChem resolution failed");
        }
        result
    }
}

fn build_compound(cid: u64, props: Properties, synonyms: &[String]) -> RegistryCompound {
    RegistryCompound {
        cid,
        name: friendly_name(synonyms).or(props.name),
        formula: props.formula,
        cas: find_cas(synonyms),
        smiles: props.smiles,
        url: format!("{COMPOUND_PAGE_URL}/{cid}"),
    }
}

/// First CAS-shaped synonym among the first 50.
pub fn find_cas(synonyms: &[String]) -> Option<String> {
    synonyms
        .iter()
        .take(CAS_SCAN_LIMIT)
        .find(|s| CAS_RE.is_match(s.trim()))
        .map(|s| s.trim().to_string())
}

/// First non-numeric synonym shorter than 80 characters among the first 10.
pub fn friendly_name(synonyms: &[String]) -> Option<String> {
    synonyms
        .iter()
        .take(NAME_SCAN_LIMIT)
        .map(|s| s.trim())
        .find(|s| !s.is_empty() && s.chars().count() < MAX_NAME_LEN && !is_numeric(s))
        .map(String::from)
}

/// Digits and separators only, e.g. CAS or EC numbers.
fn is_numeric(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit() || matches!(c, '-' | '.' | ' ' | ','))
}

/// Exactly one positive CID; empty or ambiguous lists yield nothing.
fn single_cid(cids: &Value) -> Option<u64> {
    match cids.as_array()?.as_slice() {
        [only] => only.as_u64().filter(|&cid| cid > 0),
        _ => None,
    }
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_find_cas() {
        let syns = strings(&["aspirin", "50-78-2", "2-acetoxybenzoic acid"]);
        assert_eq!(find_cas(&syns), Some("50-78-2".to_string()));
        assert_eq!(find_cas(&strings(&["aspirin", "EC 200-064-1"])), None);
        assert_eq!(find_cas(&strings(&["1-23-4"])), None);
        assert_eq!(find_cas(&strings(&["12345678-12-3"])), None);
    }

    #[test]
    fn test_cas_scan_stops_after_fifty() {
        let mut syns: Vec<String> = (0..50).map(|i| format!("name {i}")).collect();
        syns.push("64-17-5".to_string());
        assert_eq!(find_cas(&syns), None);
        syns.insert(49, "64-17-5".to_string());
        assert_eq!(find_cas(&syns), Some("64-17-5".to_string()));
    }

    #[test]
    fn test_friendly_name_skips_numeric_and_long() {
        let long = "x".repeat(MAX_NAME_LEN);
        let syns = strings(&["50-78-2", &long, "Aspirin"]);
        assert_eq!(friendly_name(&syns), Some("Aspirin".to_string()));
    }

    #[test]
    fn test_friendly_name_scan_stops_after_ten() {
        let mut syns: Vec<String> = (0..10).map(|i| format!("{i}")).collect();
        syns.push("Ethanol".to_string());
        assert_eq!(friendly_name(&syns), None);
    }

    #[test]
    fn test_build_compound_prefers_synonym_name() {
        let props = Properties {
            smiles: "CCO".to_string(),
            name: Some("ethanol".to_string()),
            formula: Some("C2H6O".to_string()),
        };
        let compound = build_compound(702, props, &strings(&["Ethyl alcohol", "64-17-5"]));
        assert_eq!(compound.name.as_deref(), Some("Ethyl alcohol"));
        assert_eq!(compound.cas.as_deref(), Some("64-17-5"));
        assert_eq!(compound.url, "https://pubchem.ncbi.nlm.nih.gov/compound/702");
    }

    #[test]
    fn test_url_encodes_query() {
        let client = PubChemClient::new("https://pubchem.example/rest/pug/", Duration::from_secs(1)).unwrap();
        let url = client.url(&["compound", "name", "sodium chloride/brine", "cids", "JSON"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://pubchem.example/rest/pug/compound/name/sodium%20chloride%2Fbrine/cids/JSON"
        );
    }

    #[test]
    fn test_single_cid_only() {
        use serde_json::json;
        assert_eq!(single_cid(&json!([2244])), Some(2244));
        assert_eq!(single_cid(&json!([2244, 99])), None);
        assert_eq!(single_cid(&json!([])), None);
        assert_eq!(single_cid(&json!([0])), None);
        assert_eq!(single_cid(&json!(["2244"])), None);
        assert_eq!(single_cid(&json!(null)), None);
    }

    #[test]
    fn test_bad_base_url() {
        assert!(matches!(
            PubChemClient::new("mailto:someone", Duration::from_secs(1)),
            Err(ResolveError::BaseUrl(_))
        ));
    }
}
