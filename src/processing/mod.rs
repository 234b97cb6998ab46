use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clients::{EmbeddingProvider, ProviderError};
use crate::domain::job::{JobUpdateRequest, NewJobRequest};
use crate::domain::user::{LoginRequest, NewUserRequest, UserUpdateRequest};
use crate::processing::auth::AuthSettings;
use crate::processing::matching::{MatchingEngine, run_matching_pass};
use crate::processing::notification::NotificationDispatcher;
use crate::repository::{JobReader, JobWriter, RepositoryError, UserReader, UserWriter};

pub mod auth;
pub mod embedding;
pub mod job;
pub mod matching;
pub mod notification;
pub mod user;

#[cfg(test)]
mod testing;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Auth(String),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Auth(_) => "auth",
            ServiceError::Provider(_) => "provider",
            ServiceError::Repository(_) => "repository",
            ServiceError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => ServiceError::NotFound("record not found".to_string()),
            RepositoryError::ValidationError(message) => ServiceError::Validation(message),
            other => ServiceError::Repository(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Collaborators shared by all message handlers.
#[derive(Clone)]
pub struct AppContext {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub engine: MatchingEngine,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub auth: AuthSettings,
}

#[derive(Deserialize, Debug, Default)]
pub struct SimilarityRequest {
    #[serde(default)]
    pub notify: bool,
}

#[derive(Deserialize, Debug)]
pub enum ZMQMessage {
    CreateUser(NewUserRequest),
    Login(LoginRequest),
    ListUsers,
    GetUser(String),
    UpdateUser((i32, UserUpdateRequest)),
    DeleteUser(i32),
    CreateJob(NewJobRequest),
    ListJobs,
    GetJob(i32),
    UpdateJob((i32, JobUpdateRequest)),
    DeleteJob(i32),
    FindSimilarity(SimilarityRequest),
}

impl ZMQMessage {
    /// Variant name, safe to log (payloads may carry passwords).
    pub fn name(&self) -> &'static str {
        match self {
            ZMQMessage::CreateUser(_) => "CreateUser",
            ZMQMessage::Login(_) => "Login",
            ZMQMessage::ListUsers => "ListUsers",
            ZMQMessage::GetUser(_) => "GetUser",
            ZMQMessage::UpdateUser(_) => "UpdateUser",
            ZMQMessage::DeleteUser(_) => "DeleteUser",
            ZMQMessage::CreateJob(_) => "CreateJob",
            ZMQMessage::ListJobs => "ListJobs",
            ZMQMessage::GetJob(_) => "GetJob",
            ZMQMessage::UpdateJob(_) => "UpdateJob",
            ZMQMessage::DeleteJob(_) => "DeleteJob",
            ZMQMessage::FindSimilarity(_) => "FindSimilarity",
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ZMQReply {
    Ok {
        message: String,
        data: serde_json::Value,
    },
    Error {
        kind: String,
        message: String,
    },
}

impl ZMQReply {
    pub fn ok<T: Serialize>(message: &str, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => ZMQReply::Ok {
                message: message.to_string(),
                data,
            },
            Err(e) => ZMQReply::Error {
                kind: "unexpected".to_string(),
                message: e.to_string(),
            },
        }
    }

    pub fn error(error: &ServiceError) -> Self {
        ZMQReply::Error {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }

    pub fn parse_error(error: &serde_json::Error) -> Self {
        ZMQReply::Error {
            kind: "validation".to_string(),
            message: format!("malformed message: {error}"),
        }
    }
}

fn reply<T: Serialize>(message: &str, outcome: ServiceResult<T>) -> ZMQReply {
    match outcome {
        Ok(data) => ZMQReply::ok(message, &data),
        Err(error) => {
            log::warn!("{message} failed: {error}");
            ZMQReply::error(&error)
        }
    }
}

/// Run a matching pass with notifications in the background.
fn spawn_matching_pass<R>(repo: R, ctx: AppContext)
where
    R: UserReader + JobReader + Send + Sync + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = run_matching_pass(&repo, &ctx, true).await {
            log::error!("Background matching pass failed: {error}");
        }
    });
}

/// Handle one command and build the reply sent back to the caller.
pub async fn process_message<R>(msg: ZMQMessage, repo: R, ctx: &AppContext) -> ZMQReply
where
    R: UserReader + UserWriter + JobReader + JobWriter + Clone + Send + Sync + 'static,
{
    log::info!("Received message: {}", msg.name());

    match msg {
        ZMQMessage::CreateUser(request) => reply(
            "User created successfully",
            user::create_user(request, &repo, ctx).await,
        ),
        ZMQMessage::Login(request) => reply(
            "Logged in successfully",
            user::login(request, &repo, ctx).await,
        ),
        ZMQMessage::ListUsers => reply("Users", user::list_users(&repo)),
        ZMQMessage::GetUser(email) => reply("User", user::find_user_by_email(&email, &repo)),
        ZMQMessage::UpdateUser((user_id, request)) => reply(
            "User successfully updated",
            user::update_user(user_id, request, &repo, ctx).await,
        ),
        ZMQMessage::DeleteUser(user_id) => reply(
            "User deleted successfully",
            user::delete_user(user_id, &repo),
        ),
        ZMQMessage::CreateJob(request) => {
            let outcome = job::create_job(request, &repo, ctx).await;
            if outcome.is_ok() {
                spawn_matching_pass(repo.clone(), ctx.clone());
            }
            reply("Job created successfully", outcome)
        }
        ZMQMessage::ListJobs => reply("Jobs", job::list_jobs(&repo)),
        ZMQMessage::GetJob(job_id) => reply("Job", job::find_job(job_id, &repo)),
        ZMQMessage::UpdateJob((job_id, request)) => reply(
            "Job successfully updated",
            job::update_job(job_id, request, &repo, ctx).await,
        ),
        ZMQMessage::DeleteJob(job_id) => {
            reply("Job deleted successfully", job::delete_job(job_id, &repo))
        }
        ZMQMessage::FindSimilarity(request) => reply(
            "Similarity computed",
            run_matching_pass(&repo, ctx, request.notify).await,
        ),
    }
}
