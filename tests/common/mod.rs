//! Helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use pushkind_jobmatch::clients::{
    EmbeddingProvider, MailTransport, ProviderResult, SuggestionProvider,
};
use pushkind_jobmatch::db::{DbPool, establish_connection_pool, run_migrations};
use pushkind_jobmatch::processing::AppContext;
use pushkind_jobmatch::processing::auth::AuthSettings;
use pushkind_jobmatch::processing::matching::MatchingEngine;
use pushkind_jobmatch::processing::notification::{MailPacer, NotificationDispatcher};
use pushkind_jobmatch::repository::DieselRepository;

/// Temporary database used in integration tests. Removed on drop.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir.");
        let path = dir.path().join("test.db");
        let pool = establish_connection_pool(path.to_str().expect("utf8 path"))
            .expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Failed to create schema.");
        TestDb { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repository(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}

/// Maps each term to a fixed direction so matches are predictable.
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| match text.as_str() {
                "rust" => vec![1.0, 0.0, 0.0],
                "sql" => vec![0.0, 1.0, 0.0],
                _ => vec![0.0, 0.0, 1.0],
            })
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("mailer mutex poisoned").clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, _html: &str) -> ProviderResult<()> {
        self.sent
            .lock()
            .expect("mailer mutex poisoned")
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

pub struct CannedAdvisor;

#[async_trait]
impl SuggestionProvider for CannedAdvisor {
    async fn improvement_suggestion(&self, job_title: &str) -> ProviderResult<String> {
        Ok(format!("Ship a side project related to {job_title}"))
    }
}

pub fn test_context(mailer: Arc<RecordingMailer>) -> AppContext {
    AppContext {
        embedder: Arc::new(KeywordEmbedder),
        engine: MatchingEngine::default(),
        dispatcher: Arc::new(NotificationDispatcher::new(
            mailer,
            Arc::new(CannedAdvisor),
            Arc::new(MailPacer::new(Duration::from_millis(1), 1000)),
        )),
        auth: AuthSettings {
            jwt_secret: "integration-secret".to_string(),
            token_ttl_days: 1,
            password_cost: 4,
        },
    }
}
