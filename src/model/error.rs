//! Error types for the review engine

use thiserror::Error;

use super::types::Source;

/// Failures of catalog calls made on behalf of a review session.
///
/// None of these stop the engine: they are logged and the session carries on.
#[derive(Error, Debug)]
pub enum ReviewError {
    /// A page or metadata request failed
    #[error("failed to fetch page at offset {offset} from {source_id}: {cause}")]
    FetchFailed {
        source_id: Source,
        offset: u32,
        #[source]
        cause: anyhow::Error,
    },

    /// Removing a track remotely failed after a Remove decision
    #[error("failed to remove track {item_id} from {source_id}: {cause}")]
    DeleteFailed {
        source_id: Source,
        item_id: String,
        #[source]
        cause: anyhow::Error,
    },
}

/// Why a raw catalog entry was rejected at admission
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidItem {
    #[error("track has no id")]
    MissingId,
    #[error("track has no name")]
    MissingName,
    #[error("track has no artists")]
    NoArtists,
}
