//! Diesel row types for the `jobs` table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::job::{Job as DomainJob, JobChanges, NewJob as DomainNewJob};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::schema::jobs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub user_id: i32,
    pub categories: String,
    pub embeddings: Option<String>,
    pub created_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::jobs)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub user_id: i32,
    pub categories: String,
    pub embeddings: Option<String>,
    pub created_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::jobs)]
pub struct JobChangeset {
    pub title: Option<String>,
    pub description: Option<String>,
    pub closed_at: Option<Option<NaiveDateTime>>,
    pub categories: Option<String>,
    pub embeddings: Option<Option<String>>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Job> for DomainJob {
    type Error = String;

    fn try_from(row: Job) -> Result<Self, Self::Error> {
        let categories = serde_json::from_str(&row.categories)
            .map_err(|e| format!("invalid categories for job {}: {e}", row.id))?;
        let embeddings = row
            .embeddings
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| format!("invalid embeddings for job {}: {e}", row.id))?;

        Ok(DomainJob {
            id: row.id,
            title: row.title,
            description: row.description,
            user_id: row.user_id,
            categories,
            embeddings,
            created_at: row.created_at,
            closed_at: row.closed_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<&DomainNewJob> for NewJob {
    type Error = serde_json::Error;

    fn try_from(job: &DomainNewJob) -> Result<Self, Self::Error> {
        let now = chrono::Utc::now().naive_utc();
        Ok(NewJob {
            title: job.title.clone(),
            description: job.description.clone(),
            user_id: job.user_id,
            categories: serde_json::to_string(&job.categories)?,
            embeddings: job
                .embeddings
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            created_at: now,
            closed_at: job.closed_at,
            updated_at: now,
        })
    }
}

impl TryFrom<&JobChanges> for JobChangeset {
    type Error = serde_json::Error;

    fn try_from(changes: &JobChanges) -> Result<Self, Self::Error> {
        Ok(JobChangeset {
            title: changes.title.clone(),
            description: changes.description.clone(),
            closed_at: changes.closed_at,
            categories: changes
                .categories
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            embeddings: match &changes.embeddings {
                Some(Some(embeddings)) => Some(Some(serde_json::to_string(embeddings)?)),
                Some(None) => Some(None),
                None => None,
            },
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}
