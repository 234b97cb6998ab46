use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::embedding::Embeddings;
use crate::domain::validation::check_length;

#[derive(Clone, Debug, Serialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub user_id: i32,
    pub categories: Vec<String>,
    pub embeddings: Option<Embeddings>,
    pub created_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub user_id: i32,
    pub categories: Vec<String>,
    pub embeddings: Option<Embeddings>,
    pub closed_at: Option<NaiveDateTime>,
}

#[derive(Clone, Debug, Default)]
pub struct JobChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub closed_at: Option<Option<NaiveDateTime>>,
    pub categories: Option<Vec<String>>,
    pub embeddings: Option<Option<Embeddings>>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewJobRequest {
    pub title: String,
    pub description: String,
    pub user_id: i32,
    pub categories: Vec<String>,
    #[serde(default)]
    pub closed_at: Option<NaiveDateTime>,
}

impl NewJobRequest {
    pub fn validate(&self) -> Result<(), String> {
        check_length("job title", &self.title, 4, 20)?;
        check_length("job description", &self.description, 24, 50)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct JobUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Absent leaves the job as is; `null` reopens it.
    #[serde(default, deserialize_with = "double_option")]
    pub closed_at: Option<Option<NaiveDateTime>>,
    #[serde(default)]
    pub categories: Option<Vec<String>>,
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl JobUpdateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            check_length("job title", title, 4, 20)?;
        }
        if let Some(description) = &self.description {
            check_length("job description", description, 24, 50)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_and_description_bounds_are_enforced() {
        let mut request = NewJobRequest {
            title: "Rust Dev".to_string(),
            description: "Build matching services in Rust".to_string(),
            user_id: 1,
            categories: vec!["rust".to_string()],
            closed_at: None,
        };
        assert!(request.validate().is_ok());

        request.title = "Dev".to_string();
        assert!(request.validate().is_err());

        request.title = "Rust Dev".to_string();
        request.description = "Too short".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn update_distinguishes_missing_and_null_closed_at() {
        let untouched: JobUpdateRequest =
            serde_json::from_str(r#"{"title":"Rust Lead"}"#).expect("valid");
        assert_eq!(untouched.closed_at, None);

        let reopened: JobUpdateRequest =
            serde_json::from_str(r#"{"closed_at":null}"#).expect("valid");
        assert_eq!(reopened.closed_at, Some(None));

        let closed: JobUpdateRequest =
            serde_json::from_str(r#"{"closed_at":"2026-01-31T12:00:00"}"#).expect("valid");
        assert!(matches!(closed.closed_at, Some(Some(_))));
    }
}
