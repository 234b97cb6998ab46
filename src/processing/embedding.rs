use crate::clients::{EmbeddingProvider, ProviderResult};
use crate::domain::embedding::Embeddings;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SimilarityError {
    #[error("vector lengths differ: {0} vs {1}")]
    LengthMismatch(usize, usize),
    #[error("vector has zero magnitude")]
    ZeroMagnitude,
}

/// Cosine similarity of two equal-length, non-zero vectors, in `[-1, 1]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, SimilarityError> {
    if a.len() != b.len() {
        return Err(SimilarityError::LengthMismatch(a.len(), b.len()));
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(SimilarityError::ZeroMagnitude);
    }

    Ok((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Embed already-normalized terms, one vector per term.
///
/// Returns `None` without calling the provider when there are no terms.
pub async fn embed_terms(
    embedder: &dyn EmbeddingProvider,
    terms: &[String],
) -> ProviderResult<Option<Embeddings>> {
    if terms.is_empty() {
        return Ok(None);
    }

    let vectors = embedder.embed(terms).await?;
    Ok(Embeddings::from_vectors(vectors))
}
