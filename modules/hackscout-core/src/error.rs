//! Failure taxonomy shared across the agents.
//!
//! Adapter failures are always absorbed at the cascade boundary;
//! generation failures surface to the composer's caller; transport
//! failures collapse into a per-message `error` status. Missing
//! credentials are checked eagerly before a batch starts.

use thiserror::Error;

/// Source-level failure. Never surfaced past the acquisition cascade —
/// the cascade logs it and treats the source as having returned nothing.
/// Kept typed so tests can distinguish "returned nothing" from "errored".
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The source's runtime dependency is absent (e.g. no browser binary).
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("timeout after {0}s")]
    Timeout(u64),
}

/// Text-generation failure from the TextGenerator collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Composition failure. Surfaced to the composer's caller, which decides
/// whether to skip the profile or abort; nothing is persisted on failure.
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
}
