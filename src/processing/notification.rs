use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use html_escape::encode_text;
use serde::Serialize;

use crate::clients::{MailTransport, ProviderResult, SuggestionProvider};
use crate::domain::similarity::{SimilarityReport, SimilarityResult};
use crate::domain::user::User;
use crate::processing::ServiceResult;

/// Spaces outgoing mail so the mail provider is not flooded.
///
/// Shared by every task of a notification pass, so the limit holds across
/// concurrently processed results.
pub struct MailPacer {
    limiter: DefaultDirectRateLimiter,
}

impl MailPacer {
    /// Allow `burst` mails at once, then one mail per `interval`.
    pub fn new(interval: Duration, burst: u32) -> Self {
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(interval.max(Duration::from_millis(1)))
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

/// Counts of mails sent during one notification pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub top_candidate_mails: usize,
    pub rejection_mails: usize,
}

impl DispatchStats {
    fn merge(self, other: Self) -> Self {
        Self {
            top_candidate_mails: self.top_candidate_mails + other.top_candidate_mails,
            rejection_mails: self.rejection_mails + other.rejection_mails,
        }
    }
}

pub struct NotificationDispatcher {
    mailer: Arc<dyn MailTransport>,
    advisor: Arc<dyn SuggestionProvider>,
    pacer: Arc<MailPacer>,
}

impl NotificationDispatcher {
    pub fn new(
        mailer: Arc<dyn MailTransport>,
        advisor: Arc<dyn SuggestionProvider>,
        pacer: Arc<MailPacer>,
    ) -> Self {
        Self {
            mailer,
            advisor,
            pacer,
        }
    }

    /// Mail every matched user and every other user of the pass.
    ///
    /// Each entry of `all_similarities` is handled by its own task. The first
    /// failing send or suggestion aborts the remaining tasks and is returned.
    pub async fn dispatch(
        &self,
        report: &SimilarityReport,
        users: &[User],
    ) -> ServiceResult<DispatchStats> {
        let tasks = report
            .all_similarities
            .iter()
            .map(|result| self.notify_result(result, users));

        let stats = future::try_join_all(tasks)
            .await?
            .into_iter()
            .fold(DispatchStats::default(), DispatchStats::merge);

        log::info!(
            "Notification pass finished: top_candidate_mails={}, rejection_mails={}",
            stats.top_candidate_mails,
            stats.rejection_mails
        );
        Ok(stats)
    }

    async fn notify_result(
        &self,
        result: &SimilarityResult,
        users: &[User],
    ) -> ServiceResult<DispatchStats> {
        let mut stats = DispatchStats::default();

        self.send(
            &result.email,
            &top_candidate_subject(&result.job_title),
            &top_candidate_body(result),
        )
        .await
        .inspect_err(|e| {
            log::error!(
                "Failed to notify top candidate {} for job {}: {e}",
                result.user_id,
                result.job_id
            )
        })?;
        stats.top_candidate_mails += 1;

        for candidate in users.iter().filter(|user| user.id != result.user_id) {
            let suggestion = self
                .advisor
                .improvement_suggestion(&result.job_title)
                .await
                .inspect_err(|e| {
                    log::error!(
                        "Failed to get improvement suggestion for job {}: {e}",
                        result.job_id
                    )
                })?;

            self.send(
                &candidate.email,
                &rejection_subject(&result.job_title),
                &rejection_body(candidate, &result.job_title, &suggestion),
            )
            .await
            .inspect_err(|e| {
                log::error!(
                    "Failed to notify candidate {} for job {}: {e}",
                    candidate.id,
                    result.job_id
                )
            })?;
            stats.rejection_mails += 1;
        }

        Ok(stats)
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> ProviderResult<()> {
        self.pacer.wait().await;
        self.mailer.send(to, subject, html).await
    }
}

fn top_candidate_subject(job_title: &str) -> String {
    format!("You are a top candidate for {job_title}")
}

fn top_candidate_body(result: &SimilarityResult) -> String {
    format!(
        "<p>Hello {name},</p>\
         <p>Good news: your skills are a strong match for the <strong>{title}</strong> \
         position and you are one of our top candidates. The hiring team will contact \
         you about the next steps.</p>\
         <p>Best regards,<br>The recruiting team</p>",
        name = encode_text(&result.user_name),
        title = encode_text(&result.job_title),
    )
}

fn rejection_subject(job_title: &str) -> String {
    format!("Thank you for your interest in {job_title}")
}

fn rejection_body(candidate: &User, job_title: &str, suggestion: &str) -> String {
    format!(
        "<p>Hello {name},</p>\
         <p>Thank you for your interest in the <strong>{title}</strong> position. \
         Another candidate was a closer match this time.</p>\
         <p>Here is how you could improve your skills for similar roles:</p>\
         <p>{suggestion}</p>\
         <p>Best regards,<br>The recruiting team</p>",
        name = encode_text(&candidate.first_name),
        title = encode_text(job_title),
        suggestion = encode_text(suggestion),
    )
}
