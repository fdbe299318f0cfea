use std::sync::Arc;

use hackscout_agents::ProfileDeduplicator;
use hackscout_core::{CandidateProfile, SourceKind, PROFILES};
use hackscout_store::{DocumentStore, MemoryStore, SortOrder};

fn candidate(name: &str, url: &str) -> CandidateProfile {
    CandidateProfile::new(name, SourceKind::PublicSearch)
        .with_email(format!("{}@example.com", name.to_lowercase()))
        .with_source_url(url)
}

#[tokio::test]
async fn distinct_source_urls_all_insert() {
    let store = Arc::new(MemoryStore::new());
    let deduplicator = ProfileDeduplicator::new(store.clone());

    let inserted = deduplicator
        .upsert_candidates(&[
            candidate("Ada", "https://github.com/ada"),
            candidate("Grace", "https://github.com/grace"),
            candidate("Linus", "https://github.com/linus"),
        ])
        .await;

    assert_eq!(inserted, 3);
    let docs = store
        .find(PROFILES, &serde_json::json!({}), SortOrder::OldestFirst, None)
        .await
        .unwrap();
    assert_eq!(docs.len(), 3);
}

#[tokio::test]
async fn second_run_is_idempotent_and_keeps_the_original_record() {
    let store = Arc::new(MemoryStore::new());
    let deduplicator = ProfileDeduplicator::new(store.clone());

    let first = candidate("Ada", "https://github.com/ada");
    assert_eq!(deduplicator.upsert_candidates(&[first]).await, 1);

    let original = store
        .find_one(PROFILES, &serde_json::json!({"source_url": "https://github.com/ada"}))
        .await
        .unwrap()
        .unwrap();

    // Same URL, different details — the stored record must not change.
    let rival = CandidateProfile::new("Ada Updated", SourceKind::LiveScrape)
        .with_source_url("https://github.com/ada")
        .with_location("Elsewhere");
    assert_eq!(deduplicator.upsert_candidates(&[rival]).await, 0);

    let stored = store
        .find_one(PROFILES, &serde_json::json!({"source_url": "https://github.com/ada"}))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, original);
}

#[tokio::test]
async fn urlless_candidates_always_insert_fresh_records() {
    let store = Arc::new(MemoryStore::new());
    let deduplicator = ProfileDeduplicator::new(store.clone());

    let synthetic = CandidateProfile::new("Alex Chen", SourceKind::Synthetic);
    let inserted = deduplicator
        .upsert_candidates(&[synthetic.clone(), synthetic])
        .await;

    // No natural key, so identical-looking candidates are distinct.
    assert_eq!(inserted, 2);
}

#[tokio::test]
async fn duplicates_within_one_batch_collapse_to_one_record() {
    let store = Arc::new(MemoryStore::new());
    let deduplicator = ProfileDeduplicator::new(store.clone());

    let inserted = deduplicator
        .upsert_candidates(&[
            candidate("Ada", "https://github.com/ada"),
            candidate("Ada B", "https://github.com/ada"),
        ])
        .await;

    assert_eq!(inserted, 1);
    let docs = store
        .find(PROFILES, &serde_json::json!({}), SortOrder::OldestFirst, None)
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
}
