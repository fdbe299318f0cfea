use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection names in the document store.
pub const PROFILES: &str = "profiles";
pub const OUTREACH_MESSAGES: &str = "outreach_messages";
pub const OUTREACH_LOGS: &str = "outreach_logs";

/// Provenance tag on persisted profiles. Not a workflow state.
pub const PROFILE_STATUS_SCRAPED: &str = "scraped";

/// Which adapter produced a candidate — data quality differs per source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    LiveScrape,
    PublicSearch,
    Synthetic,
}

impl SourceKind {
    /// Synthetic candidates are fabricated fallback data, everything
    /// else came from a real upstream.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Synthetic)
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LiveScrape => write!(f, "live_scrape"),
            Self::PublicSearch => write!(f, "public_search"),
            Self::Synthetic => write!(f, "synthetic"),
        }
    }
}

/// Outreach message lifecycle. `Generated` is the only non-terminal
/// state; the dispatcher moves each message into exactly one of the
/// other four and never touches it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachStatus {
    Generated,
    DryRun,
    Sent,
    Error,
    Skipped,
}

impl OutreachStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Generated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::DryRun => "dry_run",
            Self::Sent => "sent",
            Self::Error => "error",
            Self::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for OutreachStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OutreachStatus {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generated" => Ok(Self::Generated),
            "dry_run" => Ok(Self::DryRun),
            "sent" => Ok(Self::Sent),
            "error" => Ok(Self::Error),
            "skipped" => Ok(Self::Skipped),
            _ => Err(anyhow::anyhow!("Unknown outreach status: {}", s)),
        }
    }
}

/// Delivery channel. Email-only today; typed so the log and message
/// records stay honest if another channel ever lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
        }
    }
}

/// A profile discovered by a source adapter, not yet deduplicated or
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub email: Option<String>,
    pub skills: Vec<String>,
    pub location: String,
    pub source_url: Option<String>,
    pub source: SourceKind,
}

impl CandidateProfile {
    pub fn new(name: impl Into<String>, source: SourceKind) -> Self {
        Self {
            name: name.into(),
            email: None,
            skills: Vec::new(),
            location: String::new(),
            source_url: None,
            source,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}

/// Persisted profile. `source_url` is the natural dedup key when
/// present; empty optional fields are omitted from the stored document
/// so they never collide under a uniqueness filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub skills: Vec<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl ProfileRecord {
    /// Build a persistable record from a candidate: fresh id, provenance
    /// status, empty email/source_url dropped rather than stored as "".
    pub fn from_candidate(candidate: &CandidateProfile) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: candidate.name.clone(),
            email: candidate.email.clone().filter(|e| !e.trim().is_empty()),
            skills: candidate.skills.clone(),
            location: candidate.location.clone(),
            source_url: candidate
                .source_url
                .clone()
                .filter(|u| !u.trim().is_empty()),
            status: PROFILE_STATUS_SCRAPED.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// One invitation drafted for one profile. Created in `Generated`,
/// transitioned exactly once by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachMessageRecord {
    pub id: String,
    /// Weak link — the profile may be deleted after the message exists.
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub channel: Channel,
    pub message: String,
    pub status: OutreachStatus,
    pub created_at: DateTime<Utc>,
}

impl OutreachMessageRecord {
    pub fn generated(profile_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            profile_id: profile_id.into(),
            event_id: None,
            channel: Channel::Email,
            message: message.into(),
            status: OutreachStatus::Generated,
            created_at: Utc::now(),
        }
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }
}

/// Append-only audit record, one per dispatch attempt. Never updated
/// or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachLogRecord {
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub channel: Channel,
    pub status: OutreachStatus,
    /// Present only when `status` is `Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Event metadata used to personalize invitations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventContext {
    pub topic: String,
    pub location: Option<String>,
}

impl EventContext {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Structured event plan (TextGenerator JSON output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Workshop {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct AgendaItem {
    pub time: Option<String>,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ProblemStatement {
    pub title: String,
    pub description: String,
    pub difficulty: Option<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
}

/// Structured plan the model drafts for an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EventPlan {
    pub target_audience: Option<String>,
    pub location: Option<String>,
    pub dates: Option<String>,
    #[serde(default)]
    pub workshops: Vec<Workshop>,
    #[serde(default)]
    pub agenda: Vec<AgendaItem>,
    #[serde(default)]
    pub problem_statements: Vec<ProblemStatement>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            OutreachStatus::Generated,
            OutreachStatus::DryRun,
            OutreachStatus::Sent,
            OutreachStatus::Error,
            OutreachStatus::Skipped,
        ] {
            let parsed = OutreachStatus::from_str(status.as_str()).unwrap();
            assert_eq!(parsed, status);
        }
        assert!(OutreachStatus::from_str("bogus").is_err());
    }

    #[test]
    fn only_generated_is_non_terminal() {
        assert!(!OutreachStatus::Generated.is_terminal());
        assert!(OutreachStatus::DryRun.is_terminal());
        assert!(OutreachStatus::Sent.is_terminal());
        assert!(OutreachStatus::Error.is_terminal());
        assert!(OutreachStatus::Skipped.is_terminal());
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_value(OutreachStatus::DryRun).unwrap();
        assert_eq!(json, serde_json::json!("dry_run"));
    }

    #[test]
    fn from_candidate_drops_empty_optionals() {
        let candidate = CandidateProfile::new("Alex Chen", SourceKind::Synthetic)
            .with_email("")
            .with_source_url("  ");
        let record = ProfileRecord::from_candidate(&candidate);
        assert!(record.email.is_none());
        assert!(record.source_url.is_none());
        assert_eq!(record.status, PROFILE_STATUS_SCRAPED);

        let doc = serde_json::to_value(&record).unwrap();
        assert!(doc.get("email").is_none());
        assert!(doc.get("source_url").is_none());
    }

    #[test]
    fn from_candidate_keeps_real_fields() {
        let candidate = CandidateProfile::new("Jordan Lee", SourceKind::PublicSearch)
            .with_email("jordan@example.com")
            .with_source_url("https://github.com/jordanlee")
            .with_skills(vec!["Rust".into()])
            .with_location("Berlin, DE");
        let record = ProfileRecord::from_candidate(&candidate);
        assert_eq!(record.email.as_deref(), Some("jordan@example.com"));
        assert_eq!(record.source_url.as_deref(), Some("https://github.com/jordanlee"));
    }

    #[test]
    fn event_plan_tolerates_missing_lists() {
        let plan: EventPlan = serde_json::from_value(serde_json::json!({
            "target_audience": "students",
        }))
        .unwrap();
        assert!(plan.workshops.is_empty());
        assert!(plan.agenda.is_empty());
    }
}
