//! Shared application state for the web server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use firechem_common::OrganicGate;
use firechem_config::Config;
use firechem_db::ChemicalDb;
use firechem_sources::{CompoundResolver, HttpPredictor, PubChemClient, ReactionPredictor};
use tracing::{info, warn};

/// Shared state injected into every Axum handler. Read-only after startup.
pub struct AppState {
    pub db: Arc<ChemicalDb>,
    pub gate: OrganicGate,
    /// `None` when prediction is switched off in configuration.
    pub predictor: Option<Arc<dyn ReactionPredictor>>,
    pub resolver: Arc<dyn CompoundResolver>,
    pub max_alternates: usize,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: Arc<ChemicalDb>,
        gate: OrganicGate,
        predictor: Option<Arc<dyn ReactionPredictor>>,
        resolver: Arc<dyn CompoundResolver>,
    ) -> Self {
        Self {
            db,
            gate,
            predictor,
            resolver,
            max_alternates: 5,
            started_at: Utc::now(),
        }
    }

    pub fn with_max_alternates(mut self, max_alternates: usize) -> Self {
        self.max_alternates = max_alternates;
        self
    }

    /// Wire the real dataset and upstream clients from configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let db = ChemicalDb::load(
            config.data.chemicals_path.as_deref(),
            config.data.compatibility_path.as_deref(),
        )?;
        let gate = OrganicGate::new(config.gate.non_organic_categories.iter().cloned());

        let predictor: Option<Arc<dyn ReactionPredictor>> = if config.predictor.enabled {
            let predictor = HttpPredictor::from_config(&config.predictor)?;
            info!(
                base_url = %config.predictor.base_url,
                mode = predictor.mode(),
                "Reaction predictor configured"
            );
            Some(Arc::new(predictor))
        } else {
            warn!("Reaction prediction disabled in configuration");
            None
        };

        let resolver = Arc::new(PubChemClient::from_config(&config.pubchem)?);

        Ok(Self::new(Arc::new(db), gate, predictor, resolver)
            .with_max_alternates(config.predictor.max_alternates))
    }

    pub fn predictor_mode(&self) -> &'static str {
        self.predictor.as_ref().map_or("disabled", |p| p.mode())
    }
}

pub type SharedState = Arc<AppState>;
