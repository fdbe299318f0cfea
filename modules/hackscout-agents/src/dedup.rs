//! Deduplicated persistence of acquired candidates.

use serde_json::json;
use tracing::warn;

use hackscout_core::{CandidateProfile, ProfileRecord, PROFILES};
use hackscout_store::DocumentStore;

/// Decides whether a candidate is already known and performs an
/// insert-if-absent upsert. A candidate with a non-empty `source_url`
/// dedups on that URL; one without gets a fresh id and is always
/// inserted. Existing records are never refreshed from new candidates.
pub struct ProfileDeduplicator<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> ProfileDeduplicator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Upsert each candidate as an independent unit of work — one store
    /// call per candidate, and a failure on one logs and moves on.
    /// Returns the number of genuinely new records.
    pub async fn upsert_candidates(&self, candidates: &[CandidateProfile]) -> usize {
        let mut inserted = 0;

        for candidate in candidates {
            let record = ProfileRecord::from_candidate(candidate);

            let filter = match &record.source_url {
                Some(url) => json!({ "source_url": url }),
                None => json!({ "id": record.id }),
            };

            let doc = match serde_json::to_value(&record) {
                Ok(doc) => doc,
                Err(e) => {
                    warn!(name = %record.name, error = %e, "Failed to serialize candidate");
                    continue;
                }
            };

            match self.store.upsert(PROFILES, &filter, doc).await {
                Ok(true) => inserted += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(name = %record.name, error = %e, "Upsert failed, continuing batch");
                }
            }
        }

        inserted
    }
}
