//! Source adapters — each produces candidate profiles best-effort.
//!
//! Adapters return a typed `AdapterError` so tests can tell "errored"
//! from "returned nothing"; the cascade is the only place errors are
//! collapsed to an empty batch.

use std::time::Duration;

use async_trait::async_trait;
use rand::seq::{IndexedRandom, SliceRandom};
use tracing::{info, warn};

use hackscout_core::{AdapterError, CandidateProfile, SourceKind};

/// Upper bound on one headless-browser scrape.
const SCRAPE_TIMEOUT_SECS: u64 = 30;

/// Upper bound on one search API call.
const SEARCH_TIMEOUT_SECS: u64 = 10;

// --- SourceAdapter trait ---

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    async fn fetch(&self, query: &str, count: usize)
        -> Result<Vec<CandidateProfile>, AdapterError>;

    fn kind(&self) -> SourceKind;
}

#[async_trait]
impl<A: SourceAdapter + ?Sized> SourceAdapter for std::sync::Arc<A> {
    async fn fetch(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<CandidateProfile>, AdapterError> {
        (**self).fetch(query, count).await
    }

    fn kind(&self) -> SourceKind {
        (**self).kind()
    }
}

/// Keywords from a free-text query, used to seed candidate skills.
pub fn query_keywords(query: &str) -> Vec<String> {
    query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

// --- LiveScrapeSource ---

/// Candidate bins searched on PATH when CHROME_BIN is not set.
const CHROME_CANDIDATES: &[&str] = &["chromium", "chromium-browser", "google-chrome", "chrome"];

/// Link substrings that mark a search hit as a developer profile page.
const PROFILE_LINK_HINTS: &[&str] = &["github", "linkedin", "portfolio", "blog"];

/// Scrapes a general web search with headless Chromium (`--dump-dom`)
/// and extracts profile-looking links. The browser binary is resolved
/// once at construction; when absent the source reports `Unavailable`
/// instead of probing the filesystem on every call.
pub struct LiveScrapeSource {
    chrome_bin: Option<String>,
}

impl LiveScrapeSource {
    pub fn new(chrome_bin: Option<String>) -> Self {
        let chrome_bin = chrome_bin.or_else(resolve_chrome_on_path);
        match &chrome_bin {
            Some(bin) => info!(bin, "Live scrape available"),
            None => info!("No browser binary found, live scrape disabled"),
        }
        Self { chrome_bin }
    }

    pub fn available(&self) -> bool {
        self.chrome_bin.is_some()
    }

    /// Launch Chrome `--dump-dom` against the search page and return
    /// raw HTML. Empty output is not an error — the caller extracts
    /// zero links from it.
    async fn run_chrome(&self, bin: &str, url: &str) -> Result<String, AdapterError> {
        let tmp_dir = tempfile_dir()?;

        let result = tokio::time::timeout(
            Duration::from_secs(SCRAPE_TIMEOUT_SECS),
            tokio::process::Command::new(bin)
                .args([
                    "--headless",
                    "--no-sandbox",
                    "--disable-gpu",
                    "--disable-dev-shm-usage",
                    &format!("--user-data-dir={}", tmp_dir.display()),
                    "--dump-dom",
                    url,
                ])
                .output(),
        )
        .await;

        let _ = std::fs::remove_dir_all(&tmp_dir);

        match result {
            Ok(Ok(output)) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                warn!(url, stderr = %stderr, "Chrome exited with error");
                Ok(String::new())
            }
            Ok(Err(e)) => Err(AdapterError::Unavailable(format!(
                "failed to launch {bin}: {e}"
            ))),
            Err(_) => Err(AdapterError::Timeout(SCRAPE_TIMEOUT_SECS)),
        }
    }
}

#[async_trait]
impl SourceAdapter for LiveScrapeSource {
    async fn fetch(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<CandidateProfile>, AdapterError> {
        let Some(bin) = &self.chrome_bin else {
            return Err(AdapterError::Unavailable("no browser binary".into()));
        };

        let base_url = "https://duckduckgo.com/";
        let search_url = url::Url::parse_with_params(
            base_url,
            &[("q", format!("{query} developer profile"))],
        )
        .map_err(|e| AdapterError::Parse(e.to_string()))?;

        info!(query, count, "Live scrape starting");
        let html = self.run_chrome(bin, search_url.as_str()).await?;

        let links = extract_profile_links(&html, base_url, count);
        let skills = query_keywords(query);

        let candidates: Vec<CandidateProfile> = links
            .into_iter()
            .map(|href| {
                CandidateProfile::new(name_from_url(&href), SourceKind::LiveScrape)
                    .with_skills(skills.clone())
                    .with_source_url(href)
            })
            .collect();

        info!(query, found = candidates.len(), "Live scrape complete");
        Ok(candidates)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LiveScrape
    }
}

fn resolve_chrome_on_path() -> Option<String> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        for bin in CHROME_CANDIDATES {
            if dir.join(bin).is_file() {
                return Some(bin.to_string());
            }
        }
    }
    None
}

fn tempfile_dir() -> Result<std::path::PathBuf, AdapterError> {
    let dir = std::env::temp_dir().join(format!("hackscout-chrome-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir)
        .map_err(|e| AdapterError::Unavailable(format!("temp profile dir: {e}")))?;
    Ok(dir)
}

/// Extract absolute profile-looking links from raw HTML. Resolves
/// relative hrefs against `base_url`, skips javascript:/mailto:,
/// deduplicates, and caps at `limit`.
pub fn extract_profile_links(html: &str, base_url: &str, limit: usize) -> Vec<String> {
    let href_re = regex::Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).expect("valid regex");
    let base = url::Url::parse(base_url).ok();

    let mut seen = std::collections::HashSet::new();
    let mut links = Vec::new();

    for cap in href_re.captures_iter(html) {
        if links.len() >= limit {
            break;
        }
        let raw = &cap[1];
        if raw.starts_with("javascript:") || raw.starts_with("mailto:") {
            continue;
        }

        let resolved = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else if let Some(ref b) = base {
            match b.join(raw) {
                Ok(u) => u.to_string(),
                Err(_) => continue,
            }
        } else {
            continue;
        };

        let lower = resolved.to_lowercase();
        if PROFILE_LINK_HINTS.iter().any(|hint| lower.contains(hint)) && seen.insert(resolved.clone())
        {
            links.push(resolved);
        }
    }

    links
}

/// Display name from a profile URL's last path segment, e.g.
/// `https://github.com/octocat` → "octocat". Falls back to "Developer".
fn name_from_url(href: &str) -> String {
    url::Url::parse(href)
        .ok()
        .and_then(|u| {
            u.path_segments()?
                .filter(|s| !s.is_empty())
                .next_back()
                .map(str::to_string)
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Developer".to_string())
}

// --- PublicSearchSource ---

/// One GitHub user-search API call, unauthenticated by default. An
/// optional token raises the rate limit. Stays at a single request to
/// respect unauthenticated quotas.
pub struct PublicSearchSource {
    client: reqwest::Client,
    token: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct GithubSearchResponse {
    #[serde(default)]
    items: Vec<GithubUser>,
}

#[derive(Debug, serde::Deserialize)]
struct GithubUser {
    #[serde(default)]
    login: String,
    #[serde(default)]
    html_url: String,
}

impl PublicSearchSource {
    pub fn new(token: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, token }
    }

    fn candidates_from(items: Vec<GithubUser>, query: &str, count: usize) -> Vec<CandidateProfile> {
        let skills = query_keywords(query);
        items
            .into_iter()
            .take(count)
            .map(|user| {
                let name = if user.login.is_empty() {
                    "Developer".to_string()
                } else {
                    user.login
                };
                let mut candidate = CandidateProfile::new(name, SourceKind::PublicSearch)
                    .with_skills(skills.clone());
                if !user.html_url.is_empty() {
                    candidate = candidate.with_source_url(user.html_url);
                }
                candidate
            })
            .collect()
    }
}

#[async_trait]
impl SourceAdapter for PublicSearchSource {
    async fn fetch(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<CandidateProfile>, AdapterError> {
        info!(query, count, "Public user search");

        let per_page = count.clamp(1, 30);
        let mut request = self
            .client
            .get("https://api.github.com/search/users")
            .query(&[
                ("q", format!("{query} in:bio type:user")),
                ("per_page", per_page.to_string()),
                ("page", "1".to_string()),
            ])
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "hackscout-agent");

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| AdapterError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AdapterError::Network(format!(
                "search API returned {status}: {body}"
            )));
        }

        let data: GithubSearchResponse = resp
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        let candidates = Self::candidates_from(data.items, query, count);
        info!(query, found = candidates.len(), "Public user search complete");
        Ok(candidates)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::PublicSearch
    }
}

// --- SyntheticSource ---

const FIRST_NAMES: &[&str] = &[
    "Alex", "Jordan", "Taylor", "Morgan", "Casey", "Sam", "Jamie", "Riley", "Avery", "Dakota",
    "Reese", "Rowan",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Lee", "Chen", "Patel", "Garcia", "Brown", "Davis", "Wilson", "Martinez",
];

const BASE_SKILLS: &[&str] = &[
    "Python",
    "Machine Learning",
    "Deep Learning",
    "NLP",
    "LLMs",
    "Rust",
    "TensorFlow",
    "PyTorch",
    "Data Engineering",
    "React",
    "TypeScript",
];

const CITIES: &[&str] = &[
    "San Francisco, CA",
    "New York, NY",
    "London, UK",
    "Berlin, DE",
    "Bengaluru, IN",
    "Toronto, CA",
];

/// Guaranteed-success terminal stage: fabricates exactly the requested
/// number of plausible profiles from the query terms. No email, no
/// source URL, so downstream dedup treats each as a fresh record.
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for SyntheticSource {
    async fn fetch(
        &self,
        query: &str,
        count: usize,
    ) -> Result<Vec<CandidateProfile>, AdapterError> {
        let mut rng = rand::rng();

        let mut pool: Vec<String> = BASE_SKILLS.iter().map(|s| s.to_string()).collect();
        for keyword in query_keywords(query) {
            if !pool.contains(&keyword) {
                pool.push(keyword);
            }
        }

        let mut candidates = Vec::with_capacity(count);
        for _ in 0..count {
            let first = FIRST_NAMES.choose(&mut rng).expect("non-empty list");
            let last = LAST_NAMES.choose(&mut rng).expect("non-empty list");
            let city = CITIES.choose(&mut rng).expect("non-empty list");

            let mut skills = pool.clone();
            skills.shuffle(&mut rng);
            skills.truncate(3.min(pool.len()));

            candidates.push(
                CandidateProfile::new(format!("{first} {last}"), SourceKind::Synthetic)
                    .with_skills(skills)
                    .with_location(*city),
            );
        }

        Ok(candidates)
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }
}
