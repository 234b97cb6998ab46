//! In-memory fakes shared by the processing unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};

use crate::clients::{
    EmbeddingProvider, MailTransport, ProviderError, ProviderResult, SuggestionProvider,
};
use crate::domain::job::{Job, JobChanges, NewJob};
use crate::domain::user::{NewUser, User, UserChanges};
use crate::processing::AppContext;
use crate::processing::auth::AuthSettings;
use crate::processing::matching::MatchingEngine;
use crate::processing::notification::{MailPacer, NotificationDispatcher};
use crate::repository::{
    JobReader, JobWriter, RepositoryError, RepositoryResult, UserReader, UserWriter,
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    jobs: Vec<Job>,
    next_id: i32,
}

#[derive(Clone, Default)]
pub struct FakeRepository {
    state: Arc<Mutex<State>>,
}

impl FakeRepository {
    fn with_state<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        f(&mut state)
    }

    pub fn users(&self) -> Vec<User> {
        self.with_state(|state| state.users.clone())
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.with_state(|state| state.jobs.clone())
    }
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl UserReader for FakeRepository {
    fn list_users(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.users())
    }

    fn get_user(&self, user_id: i32) -> RepositoryResult<Option<User>> {
        Ok(self.users().into_iter().find(|user| user.id == user_id))
    }

    fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self.users().into_iter().find(|user| user.email == email))
    }
}

impl UserWriter for FakeRepository {
    fn create_user(&self, new: &NewUser) -> RepositoryResult<User> {
        self.with_state(|state| {
            state.next_id += 1;
            let user = User {
                id: state.next_id,
                first_name: new.first_name.clone(),
                last_name: new.last_name.clone(),
                username: new.username.clone(),
                email: new.email.clone(),
                password_hash: new.password_hash.clone(),
                user_type: new.user_type,
                skills: new.skills.clone(),
                embeddings: new.embeddings.clone(),
                created_at: now(),
                updated_at: now(),
            };
            state.users.push(user.clone());
            Ok(user)
        })
    }

    fn update_user(&self, user_id: i32, changes: &UserChanges) -> RepositoryResult<User> {
        self.with_state(|state| {
            let user = state
                .users
                .iter_mut()
                .find(|user| user.id == user_id)
                .ok_or(RepositoryError::NotFound)?;
            if let Some(value) = &changes.first_name {
                user.first_name = value.clone();
            }
            if let Some(value) = &changes.last_name {
                user.last_name = value.clone();
            }
            if let Some(value) = &changes.username {
                user.username = value.clone();
            }
            if let Some(value) = &changes.email {
                user.email = value.clone();
            }
            if let Some(value) = &changes.password_hash {
                user.password_hash = value.clone();
            }
            if let Some(value) = &changes.skills {
                user.skills = value.clone();
            }
            if let Some(value) = &changes.embeddings {
                user.embeddings = value.clone();
            }
            user.updated_at = now();
            Ok(user.clone())
        })
    }

    fn delete_user(&self, user_id: i32) -> RepositoryResult<User> {
        self.with_state(|state| {
            let index = state
                .users
                .iter()
                .position(|user| user.id == user_id)
                .ok_or(RepositoryError::NotFound)?;
            Ok(state.users.remove(index))
        })
    }
}

impl JobReader for FakeRepository {
    fn list_jobs(&self) -> RepositoryResult<Vec<Job>> {
        Ok(self.jobs())
    }

    fn get_job(&self, job_id: i32) -> RepositoryResult<Option<Job>> {
        Ok(self.jobs().into_iter().find(|job| job.id == job_id))
    }

    fn find_job_by_title(&self, title: &str) -> RepositoryResult<Option<Job>> {
        Ok(self.jobs().into_iter().find(|job| job.title == title))
    }
}

impl JobWriter for FakeRepository {
    fn create_job(&self, new: &NewJob) -> RepositoryResult<Job> {
        self.with_state(|state| {
            state.next_id += 1;
            let job = Job {
                id: state.next_id,
                title: new.title.clone(),
                description: new.description.clone(),
                user_id: new.user_id,
                categories: new.categories.clone(),
                embeddings: new.embeddings.clone(),
                created_at: now(),
                closed_at: new.closed_at,
                updated_at: now(),
            };
            state.jobs.push(job.clone());
            Ok(job)
        })
    }

    fn update_job(&self, job_id: i32, changes: &JobChanges) -> RepositoryResult<Job> {
        self.with_state(|state| {
            let job = state
                .jobs
                .iter_mut()
                .find(|job| job.id == job_id)
                .ok_or(RepositoryError::NotFound)?;
            if let Some(value) = &changes.title {
                job.title = value.clone();
            }
            if let Some(value) = &changes.description {
                job.description = value.clone();
            }
            if let Some(value) = changes.closed_at {
                job.closed_at = value;
            }
            if let Some(value) = &changes.categories {
                job.categories = value.clone();
            }
            if let Some(value) = &changes.embeddings {
                job.embeddings = value.clone();
            }
            job.updated_at = now();
            Ok(job.clone())
        })
    }

    fn delete_job(&self, job_id: i32) -> RepositoryResult<Job> {
        self.with_state(|state| {
            let index = state
                .jobs
                .iter()
                .position(|job| job.id == job_id)
                .ok_or(RepositoryError::NotFound)?;
            Ok(state.jobs.remove(index))
        })
    }
}

/// Embeds each text as `[1.0, len]`, recording every call.
#[derive(Default)]
pub struct FakeEmbedder {
    calls: Mutex<Vec<Vec<String>>>,
    fail: bool,
}

impl FakeEmbedder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().expect("embedder mutex poisoned").clone()
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        self.calls
            .lock()
            .expect("embedder mutex poisoned")
            .push(texts.to_vec());
        if self.fail {
            return Err(ProviderError::Decode("injected embedding failure".to_string()));
        }
        Ok(texts
            .iter()
            .map(|text| vec![1.0, text.len() as f32])
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<String>>,
}

impl RecordingMailer {
    pub fn recipients(&self) -> Vec<String> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, to: &str, _subject: &str, _html: &str) -> ProviderResult<()> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push(to.to_string());
        Ok(())
    }
}

pub struct CannedAdvisor;

#[async_trait]
impl SuggestionProvider for CannedAdvisor {
    async fn improvement_suggestion(&self, job_title: &str) -> ProviderResult<String> {
        Ok(format!("Build a project around {job_title}"))
    }
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".to_string(),
        token_ttl_days: 7,
        password_cost: 4,
    }
}

pub fn context(embedder: Arc<FakeEmbedder>, mailer: Arc<RecordingMailer>) -> AppContext {
    let pacer = Arc::new(MailPacer::new(Duration::from_millis(1), 1000));
    AppContext {
        embedder,
        engine: MatchingEngine::default(),
        dispatcher: Arc::new(NotificationDispatcher::new(
            mailer,
            Arc::new(CannedAdvisor),
            pacer,
        )),
        auth: auth_settings(),
    }
}
