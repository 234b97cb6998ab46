use serde::{Deserialize, Serialize};

/// Embedding vectors attached to a user or a job.
///
/// Older records hold a single flat vector, newer ones one vector per skill or
/// category. Both shapes deserialize from the stored JSON; use [`vectors`] to
/// get the uniform list form.
///
/// [`vectors`]: Embeddings::vectors
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Embeddings {
    Single(Vec<f32>),
    Multi(Vec<Vec<f32>>),
}

impl Embeddings {
    /// Wrap provider output; `None` when there is nothing to store.
    pub fn from_vectors(vectors: Vec<Vec<f32>>) -> Option<Self> {
        if vectors.is_empty() {
            None
        } else {
            Some(Self::Multi(vectors))
        }
    }

    /// All non-empty vectors as a list, regardless of the stored shape.
    pub fn vectors(&self) -> Vec<&[f32]> {
        match self {
            Embeddings::Single(vector) if vector.is_empty() => Vec::new(),
            Embeddings::Single(vector) => vec![vector.as_slice()],
            Embeddings::Multi(vectors) => vectors
                .iter()
                .filter(|vector| !vector.is_empty())
                .map(Vec::as_slice)
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vectors().is_empty()
    }
}

/// Normalize an optional embedding field into a list of vectors.
pub fn embedding_vectors(embeddings: Option<&Embeddings>) -> Vec<&[f32]> {
    embeddings.map(Embeddings::vectors).unwrap_or_default()
}
