//! Sentence embeddings from a Hugging Face style feature-extraction endpoint.

use async_trait::async_trait;
use formfill_core::{Embedder, Error, Result, Vector};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Serialize;

/// The sentence embedding model every chunk and query is embedded with
pub const EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

pub const DEFAULT_EMBEDDING_URL: &str =
    "https://api-inference.huggingface.co/pipeline/feature-extraction/sentence-transformers/all-MiniLM-L6-v2";

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub url: String,
    pub api_token: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_EMBEDDING_URL.to_string(),
            api_token: None,
        }
    }
}

#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: Client,
    url: String,
}

impl HuggingFaceEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(Error::InvalidConfig("missing embedding endpoint".to_string()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = config.api_token.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let auth = format!("Bearer {}", token);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth)
                    .map_err(|_| Error::InvalidConfig("invalid embedding API token".to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("failed to build embedding HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url,
        })
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    fn model(&self) -> &str {
        EMBEDDING_MODEL
    }

    async fn embed(&self, text: &str) -> Result<Vector> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let resp = self
            .client
            .post(&self.url)
            .json(&FeatureExtractionRequest::new(texts))
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embedding request failed: {}", e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(Error::Embedding(format!("embedding endpoint returned {}: {}", status, body)));
        }

        let embeddings: Vec<Vec<f32>> = resp
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("failed to parse embedding response: {}", e)))?;
        into_vectors(embeddings, texts.len())
    }
}

fn into_vectors(embeddings: Vec<Vec<f32>>, expected: usize) -> Result<Vec<Vector>> {
    if embeddings.len() != expected {
        return Err(Error::Embedding(format!(
            "{} returned {} embeddings for {} inputs",
            EMBEDDING_MODEL,
            embeddings.len(),
            expected
        )));
    }
    Ok(embeddings.into_iter().map(Vector::new).collect())
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: RequestOptions,
}

impl<'a> FeatureExtractionRequest<'a> {
    fn new(inputs: &'a [String]) -> Self {
        Self {
            inputs,
            options: RequestOptions { wait_for_model: true },
        }
    }
}

#[derive(Serialize)]
struct RequestOptions {
    wait_for_model: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let inputs = vec!["first chunk".to_string(), "second chunk".to_string()];
        let body = serde_json::to_value(FeatureExtractionRequest::new(&inputs)).unwrap();
        assert_eq!(
            body,
            json!({
                "inputs": ["first chunk", "second chunk"],
                "options": { "wait_for_model": true }
            })
        );
    }

    #[test]
    fn test_vector_count_checked() {
        let vectors = into_vectors(vec![vec![0.1, 0.2], vec![0.3, 0.4]], 2).unwrap();
        assert_eq!(vectors[1].as_slice(), &[0.3, 0.4]);
        assert!(matches!(into_vectors(vec![vec![0.1]], 2), Err(Error::Embedding(_))));
    }

    #[test]
    fn test_config_validation() {
        let config = EmbeddingConfig {
            url: " ".to_string(),
            api_token: None,
        };
        assert!(matches!(HuggingFaceEmbedder::new(config), Err(Error::InvalidConfig(_))));

        let config = EmbeddingConfig {
            api_token: Some("hf_token".to_string()),
            ..EmbeddingConfig::default()
        };
        let embedder = HuggingFaceEmbedder::new(config).unwrap();
        assert_eq!(embedder.model(), EMBEDDING_MODEL);
    }

    fn unavailable(_path: &str) -> (u16, &'static str) {
        (500, r#"{"error":"Model is currently loading"}"#)
    }

    fn two_vectors(_path: &str) -> (u16, &'static str) {
        (200, "[[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]")
    }

    #[tokio::test]
    async fn test_server_error_is_embedding_error() {
        let (base, _log) = test_server::spawn(unavailable).await;
        let embedder = HuggingFaceEmbedder::new(EmbeddingConfig {
            url: format!("{}/embed", base),
            api_token: None,
        })
        .unwrap();

        let result = embedder.embed("Full Name").await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[tokio::test]
    async fn test_embed_batch_over_http() {
        let (base, log) = test_server::spawn(two_vectors).await;
        let embedder = HuggingFaceEmbedder::new(EmbeddingConfig {
            url: format!("{}/embed", base),
            api_token: Some("hf_token".to_string()),
        })
        .unwrap();

        let inputs = vec!["Jane Doe".to_string(), "Income 52000".to_string()];
        let vectors = embedder.embed_batch(&inputs).await.unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[1].as_slice(), &[0.4, 0.5, 0.6]);

        let log = log.lock();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].path, "/embed");
        assert_eq!(log[0].authorization.as_deref(), Some("Bearer hf_token"));

        // a single-text embed against a two-vector reply is a count mismatch
        drop(log);
        assert!(matches!(embedder.embed("Jane Doe").await, Err(Error::Embedding(_))));
    }
}
