//! Ordered fallback across candidate sources until a quota is met.

use tracing::{info, warn};

use hackscout_core::{AppConfig, CandidateProfile};

use crate::sources::{LiveScrapeSource, PublicSearchSource, SourceAdapter, SyntheticSource};

/// What one acquisition run produced, split by provenance — data
/// quality differs between real sources and synthetic fallback.
#[derive(Debug, Default)]
pub struct AcquisitionReport {
    pub candidates: Vec<CandidateProfile>,
    /// Candidates from live scraping or the public search API.
    pub live_count: usize,
    /// Candidates fabricated by the synthetic terminal stage.
    pub fallback_count: usize,
}

/// Walks sources in priority order, requesting only the remaining
/// shortfall from each. Source failures are absorbed here — a failed
/// adapter contributes zero candidates and the cascade moves on. The
/// synthetic stage is infallible and fills whatever is left, so the
/// caller always gets the full target count.
pub struct AcquisitionCascade {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl AcquisitionCascade {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>) -> Self {
        Self { adapters }
    }

    /// The production ordering: live scrape, then public search, then
    /// synthetic fallback.
    pub fn standard(config: &AppConfig) -> Self {
        Self::new(vec![
            Box::new(LiveScrapeSource::new(config.chrome_bin.clone())),
            Box::new(PublicSearchSource::new(config.github_token.clone())),
            Box::new(SyntheticSource::new()),
        ])
    }

    /// Acquire up to `target_count` candidates. `target_count <= 0`
    /// yields an empty report without invoking any source.
    pub async fn acquire(&self, query: &str, target_count: i64) -> AcquisitionReport {
        let mut report = AcquisitionReport::default();
        if target_count <= 0 {
            return report;
        }
        let target = target_count as usize;

        for adapter in &self.adapters {
            if report.candidates.len() >= target {
                break;
            }
            let shortfall = target - report.candidates.len();

            match adapter.fetch(query, shortfall).await {
                Ok(mut batch) => {
                    batch.truncate(shortfall);
                    for candidate in &batch {
                        if candidate.source.is_fallback() {
                            report.fallback_count += 1;
                        } else {
                            report.live_count += 1;
                        }
                    }
                    info!(
                        source = %adapter.kind(),
                        got = batch.len(),
                        shortfall,
                        "Source contributed candidates"
                    );
                    report.candidates.append(&mut batch);
                }
                Err(e) => {
                    warn!(source = %adapter.kind(), error = %e, "Source failed, continuing cascade");
                }
            }
        }

        info!(
            query,
            total = report.candidates.len(),
            live = report.live_count,
            fallback = report.fallback_count,
            "Acquisition complete"
        );
        report
    }
}
