//! The chemical table and the pairwise compatibility rule table.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use firechem_common::{Chemical, CompatibilityRule};
use serde::Deserialize;
use tracing::info;

use crate::error::{DbError, Result};

const BUILTIN_CHEMICALS: &str = include_str!("../data/chemicals.json");
const BUILTIN_COMPATIBILITY: &str = include_str!("../data/compatibility.json");

#[derive(Deserialize)]
struct CompatibilityFile {
    rules: Vec<CompatibilityRule>,
}

/// Unordered category pair, stored sorted so (a, b) and (b, a) collide.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ChemicalDb {
    chemicals: Vec<Chemical>,
    by_smiles: HashMap<String, usize>,
    rules: Vec<CompatibilityRule>,
    by_pair: HashMap<(String, String), usize>,
}

impl ChemicalDb {
    /// The dataset compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_CHEMICALS, BUILTIN_COMPATIBILITY)
    }

    /// Load from files, falling back to the built-in copy for any path not given.
    pub fn load(chemicals_path: Option<&Path>, compatibility_path: Option<&Path>) -> Result<Self> {
        let chemicals = match chemicals_path {
            Some(path) => read(path)?,
            None => BUILTIN_CHEMICALS.to_string(),
        };
        let compatibility = match compatibility_path {
            Some(path) => read(path)?,
            None => BUILTIN_COMPATIBILITY.to_string(),
        };
        let db = Self::from_json(&chemicals, &compatibility)?;
        info!(
            chemicals = db.chemicals.len(),
            rules = db.rules.len(),
            "Chemical dataset loaded"
        );
        Ok(db)
    }

    pub fn from_json(chemicals: &str, compatibility: &str) -> Result<Self> {
        let chemicals: Vec<Chemical> = serde_json::from_str(chemicals)?;
        let file: CompatibilityFile = serde_json::from_str(compatibility)?;
        Self::from_parts(chemicals, file.rules)
    }

    /// Build the indexes. Rejects duplicate SMILES and duplicate category pairs.
    pub fn from_parts(chemicals: Vec<Chemical>, rules: Vec<CompatibilityRule>) -> Result<Self> {
        let mut by_smiles = HashMap::with_capacity(chemicals.len());
        for (idx, chem) in chemicals.iter().enumerate() {
            if chem.smiles.is_empty() {
                return Err(DbError::Invalid(format!("chemical '{}' has no SMILES", chem.name_en)));
            }
            if by_smiles.insert(chem.smiles.clone(), idx).is_some() {
                return Err(DbError::Duplicate(format!("SMILES {}", chem.smiles)));
            }
        }

        let mut by_pair = HashMap::with_capacity(rules.len());
        for (idx, rule) in rules.iter().enumerate() {
            if by_pair.insert(pair_key(&rule.group1, &rule.group2), idx).is_some() {
                return Err(DbError::Duplicate(format!(
                    "rule {} / {}",
                    rule.group1, rule.group2
                )));
            }
        }

        Ok(Self { chemicals, by_smiles, rules, by_pair })
    }

    /// Exact SMILES match only.
    pub fn find_chemical(&self, smiles: &str) -> Option<&Chemical> {
        self.by_smiles.get(smiles).map(|&idx| &self.chemicals[idx])
    }

    /// Symmetric lookup over the unordered category pair.
    pub fn find_compatibility(&self, category_a: &str, category_b: &str) -> Option<&CompatibilityRule> {
        self.by_pair
            .get(&pair_key(category_a, category_b))
            .map(|&idx| &self.rules[idx])
    }

    /// First record, in dataset order, whose English name contains the query
    /// (case-insensitive), whose Hebrew name contains it, whose CAS equals it,
    /// or whose formula equals it (case-insensitive).
    pub fn search_local(&self, query: &str) -> Option<&Chemical> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return None;
        }
        self.chemicals.iter().find(|c| {
            c.name_en.to_lowercase().contains(&q)
                || c.name_he.contains(&q)
                || c.cas == q
                || c.formula.to_lowercase() == q
        })
    }

    /// All chemicals in dataset order.
    pub fn chemicals(&self) -> &[Chemical] {
        &self.chemicals
    }

    pub fn rules(&self) -> &[CompatibilityRule] {
        &self.rules
    }

    /// Distinct categories used by the chemical table.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.chemicals.iter().map(|c| c.category_en.as_str()).collect()
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| DbError::Io {
        path: path.to_path_buf(),
        source,
    })
}
