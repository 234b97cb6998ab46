use crate::domain::job::{Job, JobChanges, JobUpdateRequest, NewJob, NewJobRequest};
use crate::domain::validation::normalize_terms;
use crate::processing::embedding::embed_terms;
use crate::processing::{AppContext, ServiceError, ServiceResult};
use crate::repository::{JobReader, JobWriter, UserReader};

fn existing_job<R: JobReader>(job_id: i32, repo: &R) -> ServiceResult<Job> {
    repo.get_job(job_id)?
        .ok_or_else(|| ServiceError::NotFound(format!("No job with id {job_id} found")))
}

fn ensure_title_available<R: JobReader>(
    title: &str,
    except: Option<i32>,
    repo: &R,
) -> ServiceResult<()> {
    match repo.find_job_by_title(title)? {
        Some(job) if Some(job.id) != except => Err(ServiceError::Validation(
            "A job with that title already exists".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Register a job posting and embed its categories.
///
/// The title check runs before the embedding provider is called.
pub async fn create_job<R>(request: NewJobRequest, repo: &R, ctx: &AppContext) -> ServiceResult<Job>
where
    R: JobReader + JobWriter + UserReader,
{
    request.validate().map_err(ServiceError::Validation)?;
    ensure_title_available(&request.title, None, repo)?;

    if repo.get_user(request.user_id)?.is_none() {
        return Err(ServiceError::NotFound(format!(
            "No user with id {} found",
            request.user_id
        )));
    }

    let categories = normalize_terms(&request.categories);
    let embeddings = embed_terms(ctx.embedder.as_ref(), &categories).await?;

    let job = repo.create_job(&NewJob {
        title: request.title,
        description: request.description,
        user_id: request.user_id,
        categories,
        embeddings,
        closed_at: request.closed_at,
    })?;

    log::info!("Created job {} \"{}\"", job.id, job.title);
    Ok(job)
}

pub fn list_jobs<R: JobReader>(repo: &R) -> ServiceResult<Vec<Job>> {
    Ok(repo.list_jobs()?)
}

pub fn find_job<R: JobReader>(job_id: i32, repo: &R) -> ServiceResult<Job> {
    existing_job(job_id, repo)
}

/// Apply a partial update; categories are re-embedded only when present.
pub async fn update_job<R>(
    job_id: i32,
    request: JobUpdateRequest,
    repo: &R,
    ctx: &AppContext,
) -> ServiceResult<Job>
where
    R: JobReader + JobWriter,
{
    request.validate().map_err(ServiceError::Validation)?;
    existing_job(job_id, repo)?;

    if let Some(title) = request.title.as_deref() {
        ensure_title_available(title, Some(job_id), repo)?;
    }

    let mut changes = JobChanges {
        title: request.title,
        description: request.description,
        closed_at: request.closed_at,
        ..Default::default()
    };

    if let Some(categories) = request.categories {
        let categories = normalize_terms(&categories);
        changes.embeddings = Some(embed_terms(ctx.embedder.as_ref(), &categories).await?);
        changes.categories = Some(categories);
    }

    let job = repo.update_job(job_id, &changes)?;
    log::info!("Updated job {job_id}");
    Ok(job)
}

pub fn delete_job<R>(job_id: i32, repo: &R) -> ServiceResult<Job>
where
    R: JobReader + JobWriter,
{
    existing_job(job_id, repo)?;
    let job = repo.delete_job(job_id)?;
    log::info!("Deleted job {job_id}");
    Ok(job)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::embedding::Embeddings;
    use crate::domain::user::{NewUser, UserType};
    use crate::processing::testing::{FakeEmbedder, FakeRepository, RecordingMailer, context};
    use crate::repository::UserWriter;

    fn poster(repo: &FakeRepository) -> i32 {
        repo.create_user(&NewUser {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            username: "grace".to_string(),
            email: "grace@example.com".to_string(),
            password_hash: "hash".to_string(),
            user_type: UserType::Employer,
            skills: Vec::new(),
            embeddings: None,
        })
        .expect("poster inserted")
        .id
    }

    fn posting(title: &str, user_id: i32, categories: &[&str]) -> NewJobRequest {
        NewJobRequest {
            title: title.to_string(),
            description: "Maintain the matching pipeline".to_string(),
            user_id,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            closed_at: None,
        }
    }

    #[tokio::test]
    async fn create_embeds_lowercased_categories() {
        let repo = FakeRepository::default();
        let embedder = Arc::new(FakeEmbedder::default());
        let ctx = context(embedder.clone(), Arc::new(RecordingMailer::default()));
        let user_id = poster(&repo);

        let job = create_job(posting("Rust Dev", user_id, &["Rust", "Tokio"]), &repo, &ctx)
            .await
            .expect("job created");

        assert_eq!(job.categories, vec!["rust", "tokio"]);
        assert_eq!(
            job.embeddings,
            Some(Embeddings::Multi(vec![vec![1.0, 4.0], vec![1.0, 5.0]]))
        );
        assert_eq!(embedder.calls().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_title_fails_without_embedding_call() {
        let repo = FakeRepository::default();
        let embedder = Arc::new(FakeEmbedder::default());
        let ctx = context(embedder.clone(), Arc::new(RecordingMailer::default()));
        let user_id = poster(&repo);
        create_job(posting("Rust Dev", user_id, &["rust"]), &repo, &ctx)
            .await
            .expect("first job");

        let error = create_job(posting("Rust Dev", user_id, &["go"]), &repo, &ctx)
            .await
            .expect_err("duplicate title");

        assert!(matches!(error, ServiceError::Validation(_)));
        assert_eq!(embedder.calls().len(), 1);
        assert_eq!(repo.jobs().len(), 1);
    }

    #[tokio::test]
    async fn embedding_failure_inserts_nothing() {
        let repo = FakeRepository::default();
        let ctx = context(
            Arc::new(FakeEmbedder::failing()),
            Arc::new(RecordingMailer::default()),
        );
        let user_id = poster(&repo);

        let error = create_job(posting("Rust Dev", user_id, &["rust"]), &repo, &ctx)
            .await
            .expect_err("provider failure");

        assert!(matches!(error, ServiceError::Provider(_)));
        assert!(repo.jobs().is_empty());
    }

    #[tokio::test]
    async fn unknown_poster_is_not_found() {
        let repo = FakeRepository::default();
        let ctx = context(
            Arc::new(FakeEmbedder::default()),
            Arc::new(RecordingMailer::default()),
        );

        let error = create_job(posting("Rust Dev", 7, &["rust"]), &repo, &ctx)
            .await
            .expect_err("no poster");

        assert!(matches!(error, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_keeps_title_unique_and_reembeds_categories() {
        let repo = FakeRepository::default();
        let embedder = Arc::new(FakeEmbedder::default());
        let ctx = context(embedder.clone(), Arc::new(RecordingMailer::default()));
        let user_id = poster(&repo);
        create_job(posting("Rust Dev", user_id, &["rust"]), &repo, &ctx)
            .await
            .expect("first job");
        let go = create_job(posting("Go Dev", user_id, &["go"]), &repo, &ctx)
            .await
            .expect("second job");

        let clash = update_job(
            go.id,
            JobUpdateRequest {
                title: Some("Rust Dev".to_string()),
                ..Default::default()
            },
            &repo,
            &ctx,
        )
        .await
        .expect_err("title taken");
        assert!(matches!(clash, ServiceError::Validation(_)));

        let retitled = update_job(
            go.id,
            JobUpdateRequest {
                title: Some("Go Dev".to_string()),
                description: Some("Keep the Go services running well".to_string()),
                ..Default::default()
            },
            &repo,
            &ctx,
        )
        .await
        .expect("own title is allowed");
        assert_eq!(retitled.embeddings, go.embeddings);
        assert_eq!(embedder.calls().len(), 2);

        let recategorized = update_job(
            go.id,
            JobUpdateRequest {
                categories: Some(vec!["Kubernetes".to_string()]),
                ..Default::default()
            },
            &repo,
            &ctx,
        )
        .await
        .expect("category update");
        assert_eq!(recategorized.categories, vec!["kubernetes"]);
        assert_eq!(
            recategorized.embeddings,
            Some(Embeddings::Multi(vec![vec![1.0, 10.0]]))
        );
        assert_eq!(embedder.calls().len(), 3);
    }

    #[tokio::test]
    async fn update_can_close_and_reopen_a_job() {
        let repo = FakeRepository::default();
        let ctx = context(
            Arc::new(FakeEmbedder::default()),
            Arc::new(RecordingMailer::default()),
        );
        let user_id = poster(&repo);
        let job = create_job(posting("Rust Dev", user_id, &["rust"]), &repo, &ctx)
            .await
            .expect("job created");
        let closed_at = chrono::NaiveDate::from_ymd_opt(2026, 1, 31)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .expect("valid date");

        let closed = update_job(
            job.id,
            JobUpdateRequest {
                closed_at: Some(Some(closed_at)),
                ..Default::default()
            },
            &repo,
            &ctx,
        )
        .await
        .expect("job closed");
        assert_eq!(closed.closed_at, Some(closed_at));

        let untouched = update_job(job.id, JobUpdateRequest::default(), &repo, &ctx)
            .await
            .expect("empty update");
        assert_eq!(untouched.closed_at, Some(closed_at));

        let reopened = update_job(
            job.id,
            JobUpdateRequest {
                closed_at: Some(None),
                ..Default::default()
            },
            &repo,
            &ctx,
        )
        .await
        .expect("job reopened");
        assert_eq!(reopened.closed_at, None);
    }

    #[tokio::test]
    async fn find_and_delete_report_missing_jobs() {
        let repo = FakeRepository::default();
        let ctx = context(
            Arc::new(FakeEmbedder::default()),
            Arc::new(RecordingMailer::default()),
        );
        let user_id = poster(&repo);
        let job = create_job(posting("Rust Dev", user_id, &["rust"]), &repo, &ctx)
            .await
            .expect("job created");

        assert_eq!(find_job(job.id, &repo).expect("found").title, "Rust Dev");
        assert_eq!(list_jobs(&repo).expect("list").len(), 1);

        delete_job(job.id, &repo).expect("deleted");

        assert!(matches!(find_job(job.id, &repo), Err(ServiceError::NotFound(_))));
        assert!(matches!(delete_job(job.id, &repo), Err(ServiceError::NotFound(_))));
    }
}
