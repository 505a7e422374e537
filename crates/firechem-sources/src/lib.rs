//! firechem-sources — Clients for the two remote dependencies.
//!
//!   pubchem      — three-step compound lookup (name → CID → properties → synonyms)
//!   predictor    — submit-then-stream / submit-then-poll reaction prediction
//!   event_stream — typed decoder for server-sent-event bodies
//!   decode       — normalisation of predictor payloads into ranked candidates

pub mod decode;
pub mod event_stream;
pub mod http;
pub mod predictor;
pub mod pubchem;

pub use predictor::{HttpPredictor, PredictorError, ReactionPredictor};
pub use pubchem::{CompoundResolver, PubChemClient, ResolveError};
