//! watsonx.ai text generation client.
//!
//! Authenticates with an IBM Cloud API key exchanged for a short-lived IAM
//! bearer token, which is cached until shortly before it expires.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use formfill_core::{qa_prompt, DocumentChunk, Error, Generator, Result};
use parking_lot::Mutex;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_WATSONX_URL: &str = "https://us-south.ml.cloud.ibm.com";
pub const DEFAULT_IAM_URL: &str = "https://iam.cloud.ibm.com/identity/token";
pub const DEFAULT_MODEL_ID: &str = "meta-llama/llama-2-70b-chat";
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 256;
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

const API_VERSION: &str = "2023-05-29";
const IAM_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";
/// Refresh tokens this many seconds before they expire
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct WatsonxConfig {
    pub url: String,
    pub iam_url: String,
    pub api_key: String,
    pub project_id: String,
    pub model_id: String,
    pub max_new_tokens: u32,
    pub temperature: f32,
}

impl WatsonxConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            url: DEFAULT_WATSONX_URL.to_string(),
            iam_url: DEFAULT_IAM_URL.to_string(),
            api_key: api_key.into(),
            project_id: project_id.into(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Clone)]
struct BearerToken {
    value: String,
    /// Unix seconds
    expires_at: u64,
}

impl BearerToken {
    fn is_fresh(&self, now: u64) -> bool {
        now + TOKEN_EXPIRY_MARGIN_SECS < self.expires_at
    }
}

pub struct WatsonxGenerator {
    client: Client,
    config: WatsonxConfig,
    endpoint: String,
    token: Mutex<Option<BearerToken>>,
}

impl WatsonxGenerator {
    pub fn new(config: WatsonxConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("missing watsonx API key".to_string()));
        }
        if config.project_id.trim().is_empty() {
            return Err(Error::InvalidConfig("missing watsonx project id".to_string()));
        }
        if config.model_id.trim().is_empty() {
            return Err(Error::InvalidConfig("missing watsonx model id".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build watsonx HTTP client: {}", e)))?;
        let endpoint = format!(
            "{}/ml/v1/text/generation?version={}",
            config.url.trim_end_matches('/'),
            API_VERSION
        );

        Ok(Self {
            client,
            config,
            endpoint,
            token: Mutex::new(None),
        })
    }

    fn request_body<'a>(&'a self, input: &'a str) -> GenerationRequest<'a> {
        GenerationRequest {
            model_id: &self.config.model_id,
            project_id: &self.config.project_id,
            input,
            parameters: GenerationParameters {
                decoding_method: "greedy",
                max_new_tokens: self.config.max_new_tokens,
                temperature: self.config.temperature,
            },
        }
    }

    fn cached_token(&self, now: u64) -> Option<String> {
        self.token
            .lock()
            .as_ref()
            .filter(|token| token.is_fresh(now))
            .map(|token| token.value.clone())
    }

    async fn bearer_token(&self) -> Result<String> {
        let now = unix_now();
        if let Some(token) = self.cached_token(now) {
            return Ok(token);
        }

        debug!("Requesting IAM token from {}", self.config.iam_url);
        let resp = self
            .client
            .post(&self.config.iam_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", IAM_GRANT_TYPE),
                ("apikey", self.config.api_key.trim()),
            ])
            .send()
            .await
            .map_err(|e| Error::Generation(format!("IAM token request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Generation(format!("IAM returned {}: {}", status, body)));
        }

        let parsed: IamTokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::Generation(format!("failed to parse IAM response: {}", e)))?;
        let expires_at = parsed
            .expiration
            .unwrap_or_else(|| now + parsed.expires_in.unwrap_or(0));

        *self.token.lock() = Some(BearerToken {
            value: parsed.access_token.clone(),
            expires_at,
        });
        Ok(parsed.access_token)
    }
}

#[async_trait]
impl Generator for WatsonxGenerator {
    fn model(&self) -> &str {
        &self.config.model_id
    }

    async fn generate(&self, question: &str, context: &[DocumentChunk]) -> Result<String> {
        let input = qa_prompt(question, context);
        let token = self.bearer_token().await?;

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&self.request_body(&input))
            .send()
            .await
            .map_err(|e| Error::Generation(format!("watsonx request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Generation(format!("watsonx returned {}: {}", status, body)));
        }

        let parsed: GenerationResponse = resp
            .json()
            .await
            .map_err(|e| Error::Generation(format!("failed to parse watsonx response: {}", e)))?;
        parsed.into_text()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model_id: &'a str,
    project_id: &'a str,
    input: &'a str,
    parameters: GenerationParameters<'a>,
}

#[derive(Serialize)]
struct GenerationParameters<'a> {
    decoding_method: &'a str,
    max_new_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    results: Vec<GenerationResult>,
}

impl GenerationResponse {
    fn into_text(self) -> Result<String> {
        self.results
            .into_iter()
            .next()
            .map(|result| result.generated_text)
            .ok_or_else(|| Error::Generation("watsonx response has no results".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct GenerationResult {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    expires_in: Option<u64>,
    expiration: Option<u64>,
}
