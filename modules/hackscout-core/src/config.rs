use anyhow::Result;

/// Default model for invitation drafting and plan generation.
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Application configuration loaded from environment variables.
/// Only the database URL is required up front; each agent checks the
/// credentials it actually needs before starting a batch.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // AI / LLM
    pub google_api_key: Option<String>,
    pub gemini_model: String,

    // Acquisition sources
    pub github_token: Option<String>,
    pub chrome_bin: Option<String>,

    // Mail (account identity + app-level secret)
    pub gmail_user: Option<String>,
    pub gmail_app_password: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL")?,
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            github_token: std::env::var("GITHUB_TOKEN").ok(),
            chrome_bin: std::env::var("CHROME_BIN").ok(),
            gmail_user: std::env::var("GMAIL_USER").ok(),
            gmail_app_password: std::env::var("GMAIL_APP_PASSWORD").ok(),
        };

        config.log_redacted();
        Ok(config)
    }

    fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("Config loaded:");
        tracing::info!("  GOOGLE_API_KEY: {}", preview_opt(&self.google_api_key));
        tracing::info!("  GEMINI_MODEL: {}", self.gemini_model);
        tracing::info!("  GITHUB_TOKEN: {}", preview_opt(&self.github_token));
        tracing::info!("  CHROME_BIN: {}", self.chrome_bin.as_deref().unwrap_or("<not set>"));
        tracing::info!("  GMAIL_USER: {}", preview_opt(&self.gmail_user));
        tracing::info!("  GMAIL_APP_PASSWORD: {}", preview_opt(&self.gmail_app_password));
    }
}
