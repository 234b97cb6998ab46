use std::collections::HashSet;

use serde::Serialize;

use crate::SIMILARITY_THRESHOLD;
use crate::domain::embedding::embedding_vectors;
use crate::domain::job::Job;
use crate::domain::similarity::{SimilarityReport, SimilarityResult};
use crate::domain::user::User;
use crate::processing::embedding::cosine_similarity;
use crate::processing::notification::DispatchStats;
use crate::processing::{AppContext, ServiceResult};
use crate::repository::{JobReader, UserReader};

/// Pairs users with jobs by comparing every skill vector against every
/// category vector.
#[derive(Clone, Copy, Debug)]
pub struct MatchingEngine {
    threshold: f32,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(SIMILARITY_THRESHOLD)
    }
}

impl MatchingEngine {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Run one matching pass over snapshots of all users and jobs.
    ///
    /// Entities without embeddings are skipped. `all_similarities` is sorted by
    /// `max_similarity` descending; `top_matches_per_user` holds the first
    /// entry per user in that order.
    pub fn find_similarity(&self, users: &[User], jobs: &[Job]) -> SimilarityReport {
        let job_vectors: Vec<(&Job, Vec<&[f32]>)> = jobs
            .iter()
            .map(|job| (job, embedding_vectors(job.embeddings.as_ref())))
            .filter(|(_, vectors)| !vectors.is_empty())
            .collect();

        let mut total_comparisons = 0;
        let mut all_similarities = Vec::new();

        for user in users {
            let user_vectors = embedding_vectors(user.embeddings.as_ref());
            if user_vectors.is_empty() {
                continue;
            }

            for (job, vectors) in &job_vectors {
                total_comparisons += 1;
                if let Some(result) = self.compare(user, &user_vectors, job, vectors) {
                    all_similarities.push(result);
                }
            }
        }

        // Stable sort keeps insertion order between equal scores
        all_similarities.sort_by(|a, b| b.max_similarity.total_cmp(&a.max_similarity));

        SimilarityReport {
            total_comparisons,
            top_matches_per_user: top_matches_per_user(&all_similarities),
            all_similarities,
        }
    }

    fn compare(
        &self,
        user: &User,
        user_vectors: &[&[f32]],
        job: &Job,
        job_vectors: &[&[f32]],
    ) -> Option<SimilarityResult> {
        let mut matched_skills = 0;
        let mut max_similarity: Option<f32> = None;

        for user_vector in user_vectors {
            for job_vector in job_vectors {
                let similarity = match cosine_similarity(user_vector, job_vector) {
                    Ok(value) => value,
                    Err(error) => {
                        log::debug!(
                            "Skipping vector pair for user {} and job {}: {error}",
                            user.id,
                            job.id
                        );
                        continue;
                    }
                };

                max_similarity = Some(max_similarity.map_or(similarity, |max| max.max(similarity)));
                if similarity >= self.threshold {
                    matched_skills += 1;
                }
            }
        }

        if matched_skills == 0 {
            return None;
        }

        Some(SimilarityResult {
            user_id: user.id,
            user_name: format!("{} {}", user.first_name, user.last_name),
            email: user.email.clone(),
            job_id: job.id,
            job_title: job.title.clone(),
            matched_skills,
            max_similarity: max_similarity.unwrap_or_default(),
        })
    }
}

/// Keep the first entry seen for each user.
fn top_matches_per_user(sorted: &[SimilarityResult]) -> Vec<SimilarityResult> {
    let mut seen = HashSet::new();
    sorted
        .iter()
        .filter(|result| seen.insert(result.user_id))
        .cloned()
        .collect()
}

#[derive(Debug, Serialize)]
pub struct MatchingOutcome {
    #[serde(flatten)]
    pub report: SimilarityReport,
    pub notifications: Option<DispatchStats>,
}

/// Load all users and jobs, match them and optionally mail the results.
pub async fn run_matching_pass<R>(
    repo: &R,
    ctx: &AppContext,
    notify: bool,
) -> ServiceResult<MatchingOutcome>
where
    R: UserReader + JobReader,
{
    let users = repo.list_users()?;
    let jobs = repo.list_jobs()?;

    let report = ctx.engine.find_similarity(&users, &jobs);
    log::info!(
        "Matching pass over {} users and {} jobs: total_comparisons={}, matches={}, users_matched={}",
        users.len(),
        jobs.len(),
        report.total_comparisons,
        report.all_similarities.len(),
        report.top_matches_per_user.len()
    );

    let notifications = if notify {
        Some(ctx.dispatcher.dispatch(&report, &users).await?)
    } else {
        None
    };

    Ok(MatchingOutcome {
        report,
        notifications,
    })
}
