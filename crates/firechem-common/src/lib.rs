//! firechem-common — Shared types used across all Firechem crates.

pub mod entities;
pub mod error;
pub mod gate;
pub mod locale;

// Re-export commonly used types
pub use entities::{
    Candidate, Chemical, CompatibilityInfo, CompatibilityRule, CustomChemical, HazardLevel,
    Prediction, Reactant, RegistryCompound, SearchMatch, UNKNOWN_CATEGORY,
};
pub use error::ErrorKind;
pub use gate::OrganicGate;
pub use locale::{Locale, Message};
