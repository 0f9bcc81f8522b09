//! HTTP client for the embedding service.
//!
//! Wire format (JSON):
//! - `POST {url}/embed` `{"text": ".."}` -> `{"vector": [f32; D]}`
//! - `POST {url}/embed_batch` `{"texts": [..]}` -> `{"vectors": [[f32; D], ..]}`
//! - `GET {url}/health` -> `{"healthy": bool, "model_name": "..", "vector_size": D}`

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use geopoi_core::config::EmbeddingSettings;
use geopoi_core::traits::Embedder;
use geopoi_core::types::EmbedderHealth;
use geopoi_core::{Error, Result};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    vector: Vec<f32>,
}

#[derive(Serialize)]
struct EmbedBatchRequest<'a> {
    texts: &'a [String],
}

#[derive(Deserialize)]
struct EmbedBatchResponse {
    vectors: Vec<Vec<f32>>,
}

fn embed_err(e: reqwest::Error) -> Error { Error::Embedding(e.to_string()) }

pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    dim: usize,
}

impl HttpEmbedder {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .build()
            .map_err(embed_err)?;
        Ok(Self { client, base_url: settings.url.trim_end_matches('/').to_string(), dim: settings.vector_size })
    }

    fn check_dim(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::Embedding(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dim,
                vector.len()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dim(&self) -> usize { self.dim }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let resp: EmbedResponse = self
            .client
            .post(format!("{}/embed", self.base_url))
            .json(&EmbedRequest { text })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(embed_err)?
            .json()
            .await
            .map_err(embed_err)?;
        self.check_dim(&resp.vector)?;
        Ok(resp.vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let resp: EmbedBatchResponse = self
            .client
            .post(format!("{}/embed_batch", self.base_url))
            .json(&EmbedBatchRequest { texts })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(embed_err)?
            .json()
            .await
            .map_err(embed_err)?;
        if resp.vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "embedding service returned {} vectors for {} texts",
                resp.vectors.len(),
                texts.len()
            )));
        }
        for v in &resp.vectors {
            self.check_dim(v)?;
        }
        Ok(resp.vectors)
    }

    async fn health(&self) -> Result<EmbedderHealth> {
        let health: EmbedderHealth = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(embed_err)?
            .json()
            .await
            .map_err(embed_err)?;
        if !health.healthy {
            return Err(Error::Embedding(format!("embedding model {} reports unhealthy", health.model_name)));
        }
        if health.vector_size != self.dim {
            return Err(Error::Embedding(format!(
                "embedding service serves {}-d vectors, configured for {}",
                health.vector_size, self.dim
            )));
        }
        Ok(health)
    }
}
