use crate::db::{DbConnection, DbPool};
use crate::domain::job::{Job, JobChanges, NewJob};
use crate::domain::user::{NewUser, User, UserChanges};

pub mod job;
pub mod user;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<diesel::result::Error> for RepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => RepositoryError::NotFound,
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                info,
            ) => RepositoryError::ValidationError(info.message().to_string()),
            other => RepositoryError::Unexpected(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for RepositoryError {
    fn from(error: diesel::r2d2::PoolError) -> Self {
        RepositoryError::ConnectionError(error.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(error: serde_json::Error) -> Self {
        RepositoryError::Unexpected(error.to_string())
    }
}

pub trait UserReader {
    fn list_users(&self) -> RepositoryResult<Vec<User>>;
    fn get_user(&self, user_id: i32) -> RepositoryResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
}

pub trait UserWriter {
    fn create_user(&self, user: &NewUser) -> RepositoryResult<User>;
    fn update_user(&self, user_id: i32, changes: &UserChanges) -> RepositoryResult<User>;
    fn delete_user(&self, user_id: i32) -> RepositoryResult<User>;
}

pub trait JobReader {
    fn list_jobs(&self) -> RepositoryResult<Vec<Job>>;
    fn get_job(&self, job_id: i32) -> RepositoryResult<Option<Job>>;
    fn find_job_by_title(&self, title: &str) -> RepositoryResult<Option<Job>>;
}

pub trait JobWriter {
    fn create_job(&self, job: &NewJob) -> RepositoryResult<Job>;
    fn update_job(&self, job_id: i32, changes: &JobChanges) -> RepositoryResult<Job>;
    fn delete_job(&self, job_id: i32) -> RepositoryResult<Job>;
}

/// Diesel-backed repository for users and jobs.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}
