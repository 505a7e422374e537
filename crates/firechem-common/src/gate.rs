//! Organic-reaction gate.
//!
//! Heuristic policy deciding whether a reactant pair is sent to the reaction
//! predictor. A pair is rejected only when *both* categories belong to the
//! non-organic set. The set is configuration data; it is not a chemical law
//! and knowingly ignores cases such as organometallics.

use std::collections::HashSet;

/// Default inorganic-leaning categories.
pub const DEFAULT_NON_ORGANIC_CATEGORIES: [&str; 6] = [
    "Water Reactive",
    "Acids",
    "Bases",
    "Oxidizers",
    "Gases",
    "Water",
];

#[derive(Debug, Clone)]
pub struct OrganicGate {
    non_organic: HashSet<String>,
}

impl OrganicGate {
    pub fn new<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            non_organic: categories.into_iter().map(Into::into).collect(),
        }
    }

    /// Exact, case-sensitive membership test.
    pub fn is_non_organic(&self, category: &str) -> bool {
        self.non_organic.contains(category)
    }

    /// True when at least one side is organic-compatible.
    pub fn allows_prediction(&self, category_a: &str, category_b: &str) -> bool {
        !(self.is_non_organic(category_a) && self.is_non_organic(category_b))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.non_organic.iter().map(String::as_str)
    }
}

impl Default for OrganicGate {
    fn default() -> Self {
        Self::new(DEFAULT_NON_ORGANIC_CATEGORIES)
    }
}
