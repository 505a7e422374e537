//! Reaction predictor client.
//!
//! One transport contract, picked by configuration:
//!
//!   stream: POST {base}/call/{endpoint}            → {"event_id": ...}
//!           GET  {base}/call/{endpoint}/{event_id}  (text/event-stream)
//!   poll:   POST {base}/{endpoint}                  → {"job_id" | "event_id" | "id": ...}
//!           GET  {base}/{endpoint}/{job_id}          every poll interval, bounded attempts
//!
//! Authorization errors fail fast; nothing is retried with other headers or URLs.

use std::time::Duration;

use async_trait::async_trait;
use firechem_common::error::Classify;
use firechem_common::{ErrorKind, Prediction};
use firechem_config::{AuthScheme, PredictorConfig, PredictorMode};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::decode::{decode_body, Decoded};
use crate::http::{build_client, snippet};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Predictor returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Predictor rejected the credentials (status {0})")]
    Unauthorized(u16),
    #[error("Submit response carried no job identifier")]
    MissingJobId,
    #[error("Malformed predictor response: {0}")]
    Malformed(String),
    #[error("Predictor reported failure: {0}")]
    Upstream(String),
    #[error("Predictor returned no candidates")]
    NoCandidates,
    #[error("No result after {attempts} attempts")]
    Timeout { attempts: u32 },
}

impl Classify for PredictorError {
    fn kind(&self) -> ErrorKind {
        match self {
            PredictorError::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            PredictorError::Http(_)
            | PredictorError::Status { .. }
            | PredictorError::Unauthorized(_) => ErrorKind::Transport,
            PredictorError::MissingJobId
            | PredictorError::Malformed(_)
            | PredictorError::Upstream(_)
            | PredictorError::NoCandidates => ErrorKind::Upstream,
            PredictorError::Timeout { .. } => ErrorKind::Timeout,
        }
    }
}

// ── Trait ─────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ReactionPredictor: Send + Sync {
    /// Predict the product of `smiles1` + `smiles2`.
    async fn predict(&self, smiles1: &str, smiles2: &str) -> Result<Prediction, PredictorError>;

    /// Short label for health output.
    fn mode(&self) -> &'static str;
}

// ── HTTP implementation ───────────────────────────────────────────────────────

pub struct HttpPredictor {
    client: Client,
    base_url: String,
    endpoint: String,
    mode: PredictorMode,
    auth: AuthScheme,
    api_key: Option<SecretString>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl HttpPredictor {
    pub fn from_config(config: &PredictorConfig) -> Result<Self, PredictorError> {
        let client = build_client(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            endpoint: config.endpoint.trim_matches('/').to_string(),
            mode: config.mode,
            auth: config.auth,
            api_key: config
                .api_key
                .as_ref()
                .map(|k| SecretString::from(k.expose_secret().to_string())),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_attempts.max(1),
        })
    }

    fn submit_url(&self) -> String {
        match self.mode {
            PredictorMode::Stream => format!("{}/call/{}", self.base_url, self.endpoint),
            PredictorMode::Poll => format!("{}/{}", self.base_url, self.endpoint),
        }
    }

    fn result_url(&self, job_id: &str) -> String {
        format!("{}/{}", self.submit_url(), job_id)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match (self.auth, &self.api_key) {
            (AuthScheme::Bearer, Some(key)) => req.bearer_auth(key.expose_secret()),
            (AuthScheme::Raw, Some(key)) => req.header(AUTHORIZATION, key.expose_secret()),
            _ => req,
        }
    }

    #[instrument(skip(self))]
    async fn submit(&self, smiles1: &str, smiles2: &str) -> Result<String, PredictorError> {
        let url = self.submit_url();
        let resp = self
            .authorize(self.client.post(&url))
            .json(&json!({ "data": [smiles1, smiles2] }))
            .send()
            .await?;
        let body = check_status(resp).await?;

        let json: Value = serde_json::from_str(&body)
            .map_err(|_| PredictorError::Malformed(format!("submit body is not JSON: {}", snippet(&body))))?;
        let job_id = job_id_from(&json).ok_or(PredictorError::MissingJobId)?;
        debug!(job_id = %job_id, "Prediction job submitted");
        Ok(job_id)
    }

    #[instrument(skip(self))]
    async fn fetch_stream(&self, job_id: &str) -> Result<Prediction, PredictorError> {
        let resp = self
            .authorize(self.client.get(self.result_url(job_id)))
            .header(ACCEPT, "text/event-stream")
            .send()
            .await?;
        let body = check_status(resp).await?;

        match decode_body(&body) {
            Some(Decoded::Ready(prediction)) => Ok(prediction),
            Some(Decoded::Failed(reason)) => Err(PredictorError::Upstream(reason)),
            Some(Decoded::Pending) => Err(PredictorError::NoCandidates),
            None => Err(PredictorError::Malformed(format!(
                "event stream carried no result: {}",
                snippet(&body)
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn poll(&self, job_id: &str) -> Result<Prediction, PredictorError> {
        let url = self.result_url(job_id);

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.poll_interval).await;
            }

            let resp = self
                .authorize(self.client.get(&url))
                .header(ACCEPT, "application/json, text/event-stream")
                .send()
                .await?;
            let body = check_status(resp).await?;

            match decode_body(&body) {
                Some(Decoded::Ready(prediction)) => {
                    debug!(attempt, "Prediction ready");
                    return Ok(prediction);
                }
                Some(Decoded::Failed(reason)) => return Err(PredictorError::Upstream(reason)),
                Some(Decoded::Pending) => debug!(attempt, "Prediction pending"),
                None => debug!(attempt, body = %snippet(&body), "Unrecognised poll body"),
            }
        }

        warn!(job_id, attempts = self.max_attempts, "Prediction poll budget exhausted");
        Err(PredictorError::Timeout { attempts: self.max_attempts })
    }
}

#[async_trait]
impl ReactionPredictor for HttpPredictor {
    async fn predict(&self, smiles1: &str, smiles2: &str) -> Result<Prediction, PredictorError> {
        info!(smiles1, smiles2, mode = self.mode.as_str(), "Requesting reaction prediction");
        let job_id = self.submit(smiles1, smiles2).await?;
        match self.mode {
            PredictorMode::Stream => self.fetch_stream(&job_id).await,
            PredictorMode::Poll => self.poll(&job_id).await,
        }
    }

    fn mode(&self) -> &'static str {
        self.mode.as_str()
    }
}

/// Returns the body on 2xx; 401/403 become `Unauthorized`.
async fn check_status(resp: Response) -> Result<String, PredictorError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PredictorError::Unauthorized(status.as_u16()));
    }
    if !status.is_success() {
        return Err(PredictorError::Status {
            status: status.as_u16(),
            message: snippet(&body),
        });
    }
    Ok(body)
}

fn job_id_from(json: &Value) -> Option<String> {
    ["event_id", "job_id", "id"].iter().find_map(|key| match &json[*key] {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}
