//! Delivery of generated invitations.

use serde_json::json;
use tracing::{info, warn};

use hackscout_core::{
    Channel, OutreachLogRecord, OutreachMessageRecord, OutreachStatus, ProfileRecord,
    OUTREACH_LOGS, OUTREACH_MESSAGES, PROFILES,
};
use hackscout_store::{DocumentStore, SortOrder};

use crate::mailer::MailTransport;

/// Subject line for every invitation email.
pub const INVITE_SUBJECT: &str = "You're invited to our AI hackathon!";

/// Moves `generated` messages into exactly one terminal state each and
/// writes one audit log row per attempt.
///
/// Delivery is at-least-once: the send happens before the status
/// update, so a crash between the two can re-deliver on the next run.
/// Callers must ensure a single dispatcher runs against a store at a
/// time — selection does not lock rows.
pub struct OutreachDispatcher<S: DocumentStore, M: MailTransport> {
    store: S,
    mailer: M,
}

impl<S: DocumentStore, M: MailTransport> OutreachDispatcher<S, M> {
    pub fn new(store: S, mailer: M) -> Self {
        Self { store, mailer }
    }

    /// Process up to `limit` pending messages, oldest first. With
    /// `dry_run` set the transport is never invoked and messages land
    /// in `dry_run` instead of `sent`. Returns the number of messages
    /// that reached `dry_run` or `sent`.
    pub async fn dispatch_pending(
        &self,
        limit: usize,
        dry_run: bool,
        event_id: Option<&str>,
    ) -> anyhow::Result<usize> {
        let mut filter = json!({ "status": OutreachStatus::Generated.as_str() });
        if let Some(event_id) = event_id {
            filter["event_id"] = json!(event_id);
        }

        let docs = self
            .store
            .find(
                OUTREACH_MESSAGES,
                &filter,
                SortOrder::OldestFirst,
                Some(limit),
            )
            .await?;

        let mut delivered = 0;
        for doc in docs {
            let message: OutreachMessageRecord = match serde_json::from_value(doc) {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed outreach message document");
                    continue;
                }
            };

            let (status, error) = self.attempt(&message, dry_run).await;
            if matches!(status, OutreachStatus::DryRun | OutreachStatus::Sent) {
                delivered += 1;
            }

            self.record_outcome(&message, status, error).await?;
        }

        info!(delivered, limit, dry_run, "Outreach dispatch complete");
        Ok(delivered)
    }

    /// One delivery attempt. Transport failures are absorbed into the
    /// `Error` status rather than aborting the batch. A store failure
    /// during the profile lookup is absorbed the same way: the message
    /// lands in `error` with the lookup error text in the log, which
    /// goes beyond the transport-only use of `error` so one unreadable
    /// profile cannot sink the rest of the batch.
    async fn attempt(
        &self,
        message: &OutreachMessageRecord,
        dry_run: bool,
    ) -> (OutreachStatus, Option<String>) {
        let email = match self.recipient_email(&message.profile_id).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                info!(profile_id = %message.profile_id, "No email on profile, skipping");
                return (OutreachStatus::Skipped, None);
            }
            Err(e) => {
                warn!(profile_id = %message.profile_id, error = %e, "Profile lookup failed");
                return (OutreachStatus::Error, Some(e.to_string()));
            }
        };

        if dry_run {
            info!(to = %email, "Dry run, not sending");
            return (OutreachStatus::DryRun, None);
        }

        match self
            .mailer
            .send(&email, INVITE_SUBJECT, &message.message)
            .await
        {
            Ok(()) => (OutreachStatus::Sent, None),
            Err(e) => {
                warn!(to = %email, error = %e, "Send failed");
                (OutreachStatus::Error, Some(e.to_string()))
            }
        }
    }

    /// The profile's email, if the profile exists and carries a
    /// non-empty address.
    async fn recipient_email(&self, profile_id: &str) -> anyhow::Result<Option<String>> {
        let Some(doc) = self
            .store
            .find_one(PROFILES, &json!({ "id": profile_id }))
            .await?
        else {
            return Ok(None);
        };
        let profile: ProfileRecord = serde_json::from_value(doc)?;
        Ok(profile.email.filter(|e| !e.trim().is_empty()))
    }

    /// Append the audit log row and advance the message status. Runs
    /// for every attempted message regardless of outcome.
    async fn record_outcome(
        &self,
        message: &OutreachMessageRecord,
        status: OutreachStatus,
        error: Option<String>,
    ) -> anyhow::Result<()> {
        let log = OutreachLogRecord {
            profile_id: message.profile_id.clone(),
            event_id: message.event_id.clone(),
            channel: Channel::Email,
            status,
            error,
            created_at: chrono::Utc::now(),
        };
        self.store
            .insert(OUTREACH_LOGS, serde_json::to_value(&log)?)
            .await?;

        self.store
            .find_one_and_update(
                OUTREACH_MESSAGES,
                &json!({ "id": message.id }),
                &json!({ "status": status.as_str() }),
            )
            .await?;
        Ok(())
    }
}
