//! Scripted implementations of the client traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use firechem_common::{Candidate, Prediction, RegistryCompound};
use firechem_sources::{CompoundResolver, PredictorError, ReactionPredictor, ResolveError};

/// What the mock predictor answers.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Ready(Vec<(String, f64)>),
    Timeout(u32),
    Upstream(String),
    NoCandidates,
    Status(u16),
}

impl MockOutcome {
    pub fn ready(candidates: &[(&str, f64)]) -> Self {
        MockOutcome::Ready(
            candidates
                .iter()
                .map(|(s, c)| (s.to_string(), *c))
                .collect(),
        )
    }

    fn produce(&self) -> Result<Prediction, PredictorError> {
        match self {
            MockOutcome::Ready(items) => {
                let candidates = items
                    .iter()
                    .map(|(smiles, confidence)| Candidate {
                        smiles: smiles.clone(),
                        confidence: *confidence,
                    })
                    .collect();
                Prediction::new(candidates).ok_or(PredictorError::NoCandidates)
            }
            MockOutcome::Timeout(attempts) => Err(PredictorError::Timeout { attempts: *attempts }),
            MockOutcome::Upstream(reason) => Err(PredictorError::Upstream(reason.clone())),
            MockOutcome::NoCandidates => Err(PredictorError::NoCandidates),
            MockOutcome::Status(status) => Err(PredictorError::Status {
                status: *status,
                message: "mock".to_string(),
            }),
        }
    }
}

/// Deterministic predictor; records every call.
pub struct MockPredictor {
    outcome: MockOutcome,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockPredictor {
    pub fn new(outcome: MockOutcome) -> Self {
        Self { outcome, calls: Mutex::new(Vec::new()) }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReactionPredictor for MockPredictor {
    async fn predict(&self, smiles1: &str, smiles2: &str) -> Result<Prediction, PredictorError> {
        self.calls
            .lock()
            .unwrap()
            .push((smiles1.to_string(), smiles2.to_string()));
        self.outcome.produce()
    }

    fn mode(&self) -> &'static str {
        "mock"
    }
}

/// Resolver backed by a fixed map; unknown queries are not found.
#[derive(Default)]
pub struct MockResolver {
    compounds: HashMap<String, RegistryCompound>,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, query: &str, compound: RegistryCompound) -> Self {
        self.compounds.insert(query.to_lowercase(), compound);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompoundResolver for MockResolver {
    async fn resolve(&self, query: &str) -> Result<RegistryCompound, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.compounds
            .get(&query.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| ResolveError::NoIdentifier(query.to_string()))
    }
}
