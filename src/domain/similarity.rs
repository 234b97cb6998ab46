use serde::Serialize;

/// One qualifying (user, job) pair from a matching pass. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityResult {
    pub user_id: i32,
    pub user_name: String,
    pub email: String,
    pub job_id: i32,
    pub job_title: String,
    pub matched_skills: usize,
    pub max_similarity: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityReport {
    pub total_comparisons: usize,
    pub top_matches_per_user: Vec<SimilarityResult>,
    pub all_similarities: Vec<SimilarityResult>,
}
