//! HTTP implementation of the external batch classifier.
//!
//! Requests go to a single endpoint as `{"changes": [{id, type, text}]}`.
//! The response is handed to [`parse_verdicts`], which copes with both plain
//! JSON and model-style text answers.
//!
//! Authentication is either a static bearer key or an OAuth2
//! client-credentials grant. Fetched tokens are cached on the client instance
//! until shortly before they expire.

use chrono::{DateTime, Duration, Utc};
use redline_core::classifier::{
    parse_verdicts, BatchClassifier, BatchFuture, BatchItem, BatchVerdict, ClassifierError,
};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::ClassifierSettings;

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;
/// Used when a token response carries no `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 300;
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// A bearer token and the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(token: impl Into<String>, lifetime_secs: i64) -> Self {
        Self {
            token: token.into(),
            expires_at: Utc::now() + Duration::seconds(lifetime_secs),
        }
    }

    /// Whether the token is still usable at `now`, keeping a safety margin.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// How requests authenticate.
#[derive(Clone)]
pub enum Credentials {
    None,
    ApiKey(String),
    ClientCredentials {
        token_url: String,
        client_id: String,
        client_secret: String,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::None => f.write_str("None"),
            Credentials::ApiKey(_) => f.write_str("ApiKey(..)"),
            Credentials::ClientCredentials { token_url, .. } => f
                .debug_struct("ClientCredentials")
                .field("token_url", token_url)
                .finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Resolve credentials from the environment variables named in `settings`.
    pub fn from_settings(settings: &ClassifierSettings) -> Result<Self, ClassifierError> {
        if let Some(token_url) = &settings.token_url {
            let client_id = env_var(&settings.client_id_env)?;
            let client_secret = env_var(&settings.client_secret_env)?;
            return Ok(Credentials::ClientCredentials {
                token_url: token_url.clone(),
                client_id,
                client_secret,
            });
        }
        match std::env::var(&settings.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Credentials::ApiKey(key)),
            _ => {
                tracing::debug!(
                    var = %settings.api_key_env,
                    "no classifier API key set, sending unauthenticated requests"
                );
                Ok(Credentials::None)
            }
        }
    }
}

fn env_var(name: &str) -> Result<String, ClassifierError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ClassifierError::Auth(format!("{} is not set", name))),
    }
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    changes: &'a [BatchItem],
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Classifier that posts batches to an HTTP endpoint.
#[derive(Debug)]
pub struct HttpBatchClassifier {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    token: Mutex<Option<CachedToken>>,
}

impl HttpBatchClassifier {
    pub fn new(endpoint: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            credentials,
            token: Mutex::new(None),
        }
    }

    /// Build a client from configuration. Returns `Ok(None)` when no endpoint
    /// is configured.
    pub fn from_settings(settings: &ClassifierSettings) -> Result<Option<Self>, ClassifierError> {
        let Some(endpoint) = &settings.endpoint else {
            return Ok(None);
        };
        let credentials = Credentials::from_settings(settings)?;
        Ok(Some(Self::new(endpoint.clone(), credentials)))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Bearer token for the next request, fetching one if needed.
    async fn bearer_token(&self) -> Result<Option<String>, ClassifierError> {
        let (token_url, client_id, client_secret) = match &self.credentials {
            Credentials::None => return Ok(None),
            Credentials::ApiKey(key) => return Ok(Some(key.clone())),
            Credentials::ClientCredentials {
                token_url,
                client_id,
                client_secret,
            } => (token_url, client_id, client_secret),
        };

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh_at(Utc::now())) {
            return Ok(Some(token.token.clone()));
        }

        tracing::debug!(url = %token_url, "fetching classifier access token");
        let response = self
            .http
            .post(token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ClassifierError::Auth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ClassifierError::Auth(format!(
                "token endpoint returned {}",
                response.status()
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Auth(format!("unreadable token response: {}", e)))?;
        let lifetime = body
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .clamp(0, MAX_TOKEN_LIFETIME_SECS);
        let token = CachedToken::new(body.access_token, lifetime);
        let bearer = token.token.clone();
        *cached = Some(token);
        Ok(Some(bearer))
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn post_batch(&self, items: &[BatchItem]) -> Result<Vec<BatchVerdict>, ClassifierError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&BatchRequest { changes: items });
        if let Some(token) = self.bearer_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.invalidate_token().await;
            return Err(ClassifierError::Auth(format!("classifier returned {}", status)));
        }
        if !status.is_success() {
            return Err(ClassifierError::Transport(format!("classifier returned {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::Transport(e.to_string()))?;
        let verdicts = parse_verdicts(&body)?;
        tracing::debug!(
            requested = items.len(),
            received = verdicts.len(),
            "classifier responded"
        );
        Ok(verdicts)
    }
}

impl BatchClassifier for HttpBatchClassifier {
    fn classify_batch<'a>(&'a self, items: &'a [BatchItem]) -> BatchFuture<'a> {
        Box::pin(self.post_batch(items))
    }

    fn name(&self) -> &str {
        "http"
    }
}
