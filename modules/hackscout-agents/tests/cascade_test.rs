use async_trait::async_trait;

use hackscout_agents::cascade::AcquisitionCascade;
use hackscout_agents::sources::{SourceAdapter, SyntheticSource};
use hackscout_agents::ProfileDeduplicator;
use hackscout_core::{AdapterError, CandidateProfile, SourceKind, PROFILES};

/// Adapter returning a fixed number of candidates regardless of what
/// was asked for.
struct FixedSource {
    kind: SourceKind,
    yield_count: usize,
}

#[async_trait]
impl SourceAdapter for FixedSource {
    async fn fetch(
        &self,
        _query: &str,
        _count: usize,
    ) -> Result<Vec<CandidateProfile>, AdapterError> {
        Ok((0..self.yield_count)
            .map(|i| {
                CandidateProfile::new(format!("Candidate {i}"), self.kind)
                    .with_source_url(format!("https://example.com/{}/{i}", self.kind))
            })
            .collect())
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}

/// Adapter that always fails.
struct BrokenSource;

#[async_trait]
impl SourceAdapter for BrokenSource {
    async fn fetch(
        &self,
        _query: &str,
        _count: usize,
    ) -> Result<Vec<CandidateProfile>, AdapterError> {
        Err(AdapterError::Unavailable("no browser".into()))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::LiveScrape
    }
}

/// Adapter that records how many candidates it was asked for.
struct CountingSource {
    kind: SourceKind,
    asked: std::sync::Mutex<Vec<usize>>,
}

#[async_trait]
impl SourceAdapter for CountingSource {
    async fn fetch(
        &self,
        _query: &str,
        count: usize,
    ) -> Result<Vec<CandidateProfile>, AdapterError> {
        self.asked.lock().unwrap().push(count);
        Ok(Vec::new())
    }

    fn kind(&self) -> SourceKind {
        self.kind
    }
}

#[tokio::test]
async fn first_source_satisfying_target_stops_the_cascade() {
    let cascade = AcquisitionCascade::new(vec![
        Box::new(FixedSource {
            kind: SourceKind::LiveScrape,
            yield_count: 5,
        }),
        Box::new(BrokenSource),
    ]);

    let report = cascade.acquire("rust devs", 5).await;
    assert_eq!(report.candidates.len(), 5);
    assert_eq!(report.live_count, 5);
    assert_eq!(report.fallback_count, 0);
}

#[tokio::test]
async fn later_sources_are_asked_only_for_the_shortfall() {
    let counting = std::sync::Arc::new(CountingSource {
        kind: SourceKind::PublicSearch,
        asked: std::sync::Mutex::new(Vec::new()),
    });
    let cascade = AcquisitionCascade::new(vec![
        Box::new(FixedSource {
            kind: SourceKind::LiveScrape,
            yield_count: 3,
        }),
        Box::new(counting.clone()),
        Box::new(SyntheticSource::new()),
    ]);

    let report = cascade.acquire("rust devs", 10).await;
    assert_eq!(counting.asked.lock().unwrap().as_slice(), &[7]);
    assert_eq!(report.candidates.len(), 10);
    assert_eq!(report.live_count, 3);
    assert_eq!(report.fallback_count, 7);
}

#[tokio::test]
async fn failed_sources_contribute_nothing_and_synthetic_fills_the_gap() {
    let cascade = AcquisitionCascade::new(vec![
        Box::new(BrokenSource),
        Box::new(FixedSource {
            kind: SourceKind::PublicSearch,
            yield_count: 0,
        }),
        Box::new(SyntheticSource::new()),
    ]);

    let report = cascade.acquire("ml engineers", 4).await;
    assert_eq!(report.candidates.len(), 4);
    assert_eq!(report.live_count, 0);
    assert_eq!(report.fallback_count, 4);
    assert!(report
        .candidates
        .iter()
        .all(|c| c.source == SourceKind::Synthetic));
}

#[tokio::test]
async fn overdelivering_source_is_truncated_to_target() {
    let cascade = AcquisitionCascade::new(vec![Box::new(FixedSource {
        kind: SourceKind::PublicSearch,
        yield_count: 50,
    })]);

    let report = cascade.acquire("devs", 3).await;
    assert_eq!(report.candidates.len(), 3);
    assert_eq!(report.live_count, 3);
}

#[tokio::test]
async fn non_positive_target_yields_empty_report_without_calling_sources() {
    let counting = std::sync::Arc::new(CountingSource {
        kind: SourceKind::LiveScrape,
        asked: std::sync::Mutex::new(Vec::new()),
    });
    let cascade = AcquisitionCascade::new(vec![Box::new(counting.clone())]);

    for target in [0, -3] {
        let report = cascade.acquire("devs", target).await;
        assert!(report.candidates.is_empty());
        assert_eq!(report.live_count, 0);
        assert_eq!(report.fallback_count, 0);
    }
    assert!(counting.asked.lock().unwrap().is_empty());
}

#[tokio::test]
async fn acquired_batch_flows_through_dedup_end_to_end() {
    // Live scrape finds one real profile, search finds nothing, synthetic
    // fills the remaining two.
    let cascade = AcquisitionCascade::new(vec![
        Box::new(FixedSource {
            kind: SourceKind::LiveScrape,
            yield_count: 1,
        }),
        Box::new(FixedSource {
            kind: SourceKind::PublicSearch,
            yield_count: 0,
        }),
        Box::new(SyntheticSource::new()),
    ]);

    let report = cascade.acquire("AI developer", 3).await;
    assert_eq!(report.candidates.len(), 3);
    assert_eq!(report.live_count, 1);
    assert_eq!(report.fallback_count, 2);

    let store = std::sync::Arc::new(hackscout_store::MemoryStore::new());
    let deduplicator = ProfileDeduplicator::new(store.clone());
    let inserted = deduplicator.upsert_candidates(&report.candidates).await;

    // One candidate carries a source_url, two synthetic ones do not —
    // all three are new records.
    assert_eq!(inserted, 3);
    assert_eq!(store.len(PROFILES), 3);
}

#[tokio::test]
async fn synthetic_terminal_stage_always_hits_the_exact_target() {
    let cascade = AcquisitionCascade::new(vec![Box::new(SyntheticSource::new())]);
    let report = cascade.acquire("anything", 25).await;
    assert_eq!(report.candidates.len(), 25);
    assert_eq!(report.fallback_count, 25);
}
