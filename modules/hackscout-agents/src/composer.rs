//! Invitation drafting via the text-generation collaborator.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use gemini_client::{GeminiClient, GeminiError};
use hackscout_core::{
    ComposeError, EventContext, EventPlan, GenerationError, OutreachMessageRecord, ProfileRecord,
    OUTREACH_MESSAGES, PROFILES,
};
use hackscout_store::{DocumentStore, SortOrder};

// --- TextGenerator trait ---

/// Opaque generative-text backend: prompt in, text or JSON out.
/// Fallible and possibly slow; callers own timeout and retry policy.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, GenerationError>;
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        GeminiClient::generate(self, prompt).await.map_err(map_err)
    }

    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, GenerationError> {
        GeminiClient::generate_json(self, prompt)
            .await
            .map_err(map_err)
    }
}

fn map_err(err: GeminiError) -> GenerationError {
    match err {
        GeminiError::MissingKey => GenerationError::MissingCredential("GOOGLE_API_KEY".into()),
        GeminiError::Network(msg) => GenerationError::Upstream(msg),
        GeminiError::Api { status, message } => {
            GenerationError::Upstream(format!("status {status}: {message}"))
        }
        GeminiError::Parse(msg) => GenerationError::Malformed(msg),
        GeminiError::EmptyResponse => GenerationError::Malformed("empty response".into()),
    }
}

// --- Prompts ---

fn invite_prompt(profile: &ProfileRecord, context: Option<&EventContext>) -> String {
    let skills = profile.skills.join(", ");
    match context {
        Some(event) => {
            let location = event.location.as_deref().unwrap_or("online");
            format!(
                "Write a personalized invitation to a hackathon about {topic} \
                 taking place in {location} for:\n\
                 Name: {name}\n\
                 Skills: {skills}\n\
                 Location: {profile_location}\n\n\
                 Make it exciting, mention the event topic, include hackathon benefits.\n\
                 Keep under 150 words and professional tone.",
                topic = event.topic,
                name = profile.name,
                profile_location = profile.location,
            )
        }
        None => format!(
            "Write a personalized hackathon invitation for:\n\
             Name: {name}\n\
             Skills: {skills}\n\
             Location: {location}\n\n\
             Make it exciting, mention AI focus, include hackathon benefits.\n\
             Keep under 150 words and professional tone.",
            name = profile.name,
            location = profile.location,
        ),
    }
}

fn plan_prompt(topic: &str, location: Option<&str>, audience: Option<&str>) -> String {
    let schema = schemars::schema_for!(EventPlan);
    let schema_json = serde_json::to_string_pretty(&schema).unwrap_or_default();

    format!(
        "You are an expert hackathon organizer. Produce a structured JSON plan \
         for a hackathon.\n\
         Topic: {topic}\n\
         Location: {location}\n\
         Target audience: {audience}\n\n\
         Respond with JSON only, no prose, matching this JSON schema:\n{schema_json}",
        location = location.unwrap_or("unspecified"),
        audience = audience.unwrap_or("unspecified"),
    )
}

// --- MessageComposer ---

/// Turns a profile (and optional event context) into invitation text.
/// Composition failures propagate; persistence is the caller's job so
/// previews and dry runs have no side effects.
pub struct MessageComposer<G: TextGenerator> {
    generator: G,
}

impl<G: TextGenerator> MessageComposer<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Draft one invitation. Returns the trimmed response text.
    pub async fn compose(
        &self,
        profile: &ProfileRecord,
        context: Option<&EventContext>,
    ) -> Result<String, ComposeError> {
        let prompt = invite_prompt(profile, context);
        let text = self.generator.generate(&prompt).await?;
        Ok(text.trim().to_string())
    }

    /// Draft and persist one `generated` message per recent profile, up
    /// to `limit`. A generation failure on one profile skips it and the
    /// batch continues; the count of persisted messages is returned.
    pub async fn generate_pending<S: DocumentStore>(
        &self,
        store: &S,
        limit: usize,
        event_id: Option<&str>,
        context: Option<&EventContext>,
    ) -> anyhow::Result<usize> {
        let docs = store
            .find(PROFILES, &json!({}), SortOrder::NewestFirst, Some(limit))
            .await?;

        let mut generated = 0;
        for doc in docs {
            let profile: ProfileRecord = match serde_json::from_value(doc) {
                Ok(p) => p,
                Err(e) => {
                    warn!(error = %e, "Skipping malformed profile document");
                    continue;
                }
            };

            let text = match self.compose(&profile, context).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(profile_id = %profile.id, error = %e, "Composition failed, skipping profile");
                    continue;
                }
            };

            let mut message = OutreachMessageRecord::generated(&profile.id, text);
            if let Some(event_id) = event_id {
                message = message.with_event_id(event_id);
            }
            store
                .insert(OUTREACH_MESSAGES, serde_json::to_value(&message)?)
                .await?;
            generated += 1;
        }

        info!(generated, limit, "Message generation complete");
        Ok(generated)
    }

    /// Draft a structured plan for an event via the generator's JSON
    /// output.
    pub async fn draft_plan(
        &self,
        topic: &str,
        location: Option<&str>,
        audience: Option<&str>,
    ) -> Result<EventPlan, ComposeError> {
        let prompt = plan_prompt(topic, location, audience);
        let value = self.generator.generate_json(&prompt).await?;
        let plan = serde_json::from_value(value)
            .map_err(|e| GenerationError::Malformed(format!("plan did not match schema: {e}")))?;
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Fake generator that records prompts and replays scripted
    /// responses.
    struct FakeGenerator {
        prompts: Mutex<Vec<String>>,
        response: Result<String, &'static str>,
    }

    impl FakeGenerator {
        fn ok(text: &str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                response: Ok(text.to_string()),
            }
        }

        fn failing(msg: &'static str) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                response: Err(msg),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.response
                .clone()
                .map_err(|m| GenerationError::Upstream(m.to_string()))
        }

        async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, GenerationError> {
            let text = self.generate(prompt).await?;
            serde_json::from_str(&text).map_err(|e| GenerationError::Malformed(e.to_string()))
        }
    }

    fn profile(name: &str) -> ProfileRecord {
        ProfileRecord {
            id: "p1".into(),
            name: name.into(),
            email: None,
            skills: vec!["Rust".into(), "NLP".into()],
            location: "Berlin, DE".into(),
            source_url: None,
            status: "scraped".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn compose_substitutes_profile_fields_and_trims() {
        let generator = FakeGenerator::ok("  Hello Ada!  \n");
        let composer = MessageComposer::new(generator);

        let text = composer.compose(&profile("Ada"), None).await.unwrap();
        assert_eq!(text, "Hello Ada!");

        let prompts = composer.generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Name: Ada"));
        assert!(prompts[0].contains("Skills: Rust, NLP"));
        assert!(prompts[0].contains("Location: Berlin, DE"));
    }

    #[tokio::test]
    async fn compose_uses_event_context_when_given() {
        let generator = FakeGenerator::ok("hi");
        let composer = MessageComposer::new(generator);
        let context = EventContext::new("AI agents").with_location("Lisbon");

        composer
            .compose(&profile("Ada"), Some(&context))
            .await
            .unwrap();

        let prompts = composer.generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("AI agents"));
        assert!(prompts[0].contains("Lisbon"));
    }

    #[tokio::test]
    async fn compose_propagates_generation_failures() {
        let generator = FakeGenerator::failing("quota exceeded");
        let composer = MessageComposer::new(generator);

        let err = composer.compose(&profile("Ada"), None).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn draft_plan_parses_schema_shaped_json() {
        let generator = FakeGenerator::ok(
            r#"{"target_audience": "students", "workshops": [{"title": "Intro to LLMs"}]}"#,
        );
        let composer = MessageComposer::new(generator);

        let plan = composer
            .draft_plan("AI agents", Some("Lisbon"), None)
            .await
            .unwrap();
        assert_eq!(plan.target_audience.as_deref(), Some("students"));
        assert_eq!(plan.workshops.len(), 1);
    }

    #[tokio::test]
    async fn draft_plan_rejects_non_json_output() {
        let generator = FakeGenerator::ok("sure! here is a plan: ...");
        let composer = MessageComposer::new(generator);

        let err = composer
            .draft_plan("AI agents", None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ComposeError::Generation(GenerationError::Malformed(_))
        ));
    }
}
