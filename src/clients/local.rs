use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::clients::{EmbeddingProvider, ProviderError, ProviderResult, ensure_vector_count};

/// Embeds text with a local ONNX model through `fastembed`.
pub struct LocalEmbedder {
    embedder: Arc<Mutex<TextEmbedding>>,
}

impl LocalEmbedder {
    pub fn new(model: EmbeddingModel) -> ProviderResult<Self> {
        let embedder = TextEmbedding::try_new(InitOptions::new(model))
            .map_err(|error| ProviderError::Model(format!("{error:?}")))?;

        Ok(Self {
            embedder: Arc::new(Mutex::new(embedder)),
        })
    }

    /// Resolve a configured model code, e.g. `"BAAI/bge-small-en-v1.5"`.
    pub fn from_model_name(name: &str) -> ProviderResult<Self> {
        let model = TextEmbedding::list_supported_models()
            .into_iter()
            .find(|info| info.model_code.eq_ignore_ascii_case(name))
            .map(|info| info.model)
            .ok_or_else(|| ProviderError::Build(format!("unknown embedding model: {name}")))?;
        Self::new(model)
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedder {
    async fn embed(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embedder = Arc::clone(&self.embedder);
        let input = texts.to_vec();

        // Inference is CPU bound
        let vectors = tokio::task::spawn_blocking(move || {
            let mut embedder = embedder
                .lock()
                .map_err(|_| ProviderError::Model("embedder mutex poisoned".to_string()))?;
            embedder
                .embed(input, None)
                .map_err(|error| ProviderError::Model(format!("{error:?}")))
        })
        .await
        .map_err(|error| ProviderError::Model(error.to_string()))??;

        ensure_vector_count(texts.len(), &vectors)?;
        Ok(vectors)
    }
}
