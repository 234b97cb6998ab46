pub mod clients;
pub mod db;
pub mod domain;
pub mod models;
pub mod processing;
pub mod repository;
pub mod schema;

/// Shared cosine-similarity threshold for automatic matching workflows.
pub const SIMILARITY_THRESHOLD: f32 = 0.8;
