use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gemini_client::GeminiClient;
use hackscout_agents::{
    cli, AcquisitionCascade, MessageComposer, NoopMailer, OutreachDispatcher, ProfileDeduplicator,
    SmtpMailer,
};
use hackscout_core::{AppConfig, EventContext};
use hackscout_store::PgDocStore;

const USAGE: &str = "Usage: hackscout <command> [flags]

Commands:
  recruit   --query <text> [--limit <n>]
  compose   [--limit <n>] [--event-id <id>] [--event-topic <text>] [--event-location <text>]
  outreach  [--limit <n>] [--dry-run] [--event-id <id>]
  plan      --topic <text> [--location <text>] [--audience <text>]";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hackscout=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let flags = &args[1..];

    let config = AppConfig::from_env()?;
    let store = PgDocStore::connect(&config.database_url).await?;
    store.migrate().await?;

    match command {
        "recruit" => recruit(&config, &store, flags).await,
        "compose" => compose(&config, &store, flags).await,
        "outreach" => outreach(&config, &store, flags).await,
        "plan" => plan(&config, flags).await,
        other => {
            eprintln!("Unknown command: {other}\n\n{USAGE}");
            std::process::exit(2);
        }
    }
}

/// Acquire candidates through the source cascade and persist the
/// deduplicated set.
async fn recruit(config: &AppConfig, store: &PgDocStore, flags: &[String]) -> Result<()> {
    let query = cli::flag_value(flags, "--query")
        .ok_or_else(|| anyhow::anyhow!("recruit requires --query"))?;
    let limit = cli::flag_i64(flags, "--limit", 10)?;

    info!(query, limit, "Starting recruitment run");

    let cascade = AcquisitionCascade::standard(config);
    let report = cascade.acquire(&query, limit).await;

    let deduplicator = ProfileDeduplicator::new(store);
    let inserted = deduplicator.upsert_candidates(&report.candidates).await;

    println!(
        "Scraped: {}, Fallback: {}, Inserted: {}",
        report.live_count, report.fallback_count, inserted
    );
    Ok(())
}

/// Draft invitations for recently acquired profiles.
async fn compose(config: &AppConfig, store: &PgDocStore, flags: &[String]) -> Result<()> {
    let limit = cli::flag_usize(flags, "--limit", 10)?;
    let event_id = cli::flag_value(flags, "--event-id");
    let context = cli::flag_value(flags, "--event-topic").map(|topic| {
        let mut ctx = EventContext::new(topic);
        if let Some(location) = cli::flag_value(flags, "--event-location") {
            ctx = ctx.with_location(location);
        }
        ctx
    });

    let generator = gemini(config)?;
    let composer = MessageComposer::new(generator);
    let generated = composer
        .generate_pending(store, limit, event_id.as_deref(), context.as_ref())
        .await?;

    println!("Generated: {generated}");
    Ok(())
}

/// Deliver pending invitations, or walk them through a dry run.
async fn outreach(config: &AppConfig, store: &PgDocStore, flags: &[String]) -> Result<()> {
    let limit = cli::flag_usize(flags, "--limit", 10)?;
    let dry_run = cli::has_flag(flags, "--dry-run");
    let event_id = cli::flag_value(flags, "--event-id");

    let delivered = if dry_run {
        OutreachDispatcher::new(store, NoopMailer)
            .dispatch_pending(limit, true, event_id.as_deref())
            .await?
    } else {
        let mailer = SmtpMailer::from_credentials(
            config.gmail_user.as_deref(),
            config.gmail_app_password.as_deref(),
        )?;
        OutreachDispatcher::new(store, mailer)
            .dispatch_pending(limit, false, event_id.as_deref())
            .await?
    };

    println!("Delivered: {delivered}");
    Ok(())
}

/// Draft a structured event plan and print it as JSON.
async fn plan(config: &AppConfig, flags: &[String]) -> Result<()> {
    let topic = cli::flag_value(flags, "--topic")
        .ok_or_else(|| anyhow::anyhow!("plan requires --topic"))?;
    let location = cli::flag_value(flags, "--location");
    let audience = cli::flag_value(flags, "--audience");

    let generator = gemini(config)?;
    let composer = MessageComposer::new(generator);
    let plan = composer
        .draft_plan(&topic, location.as_deref(), audience.as_deref())
        .await?;

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn gemini(config: &AppConfig) -> Result<GeminiClient> {
    let key = config.google_api_key.as_deref().unwrap_or("");
    Ok(GeminiClient::new(key, &config.gemini_model)?)
}
