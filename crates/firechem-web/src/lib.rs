//! firechem-web — HTTP API for Firechem
//! Provides:
//!   - Pairwise compatibility assessment with optional reaction prediction
//!   - Compound search across the local dataset and PubChem
//!   - Picker data and a health endpoint

pub mod assembler;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
