//! Model module - Review state and data types
//!
//! This module contains the data structures and state machines of the review queue.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (tracks, sources, decisions)
//! - `error`: Review error taxonomy
//! - `catalog`: Catalog client trait and the page fetcher
//! - `buffer`: Deduplicating track buffer
//! - `session`: Per-source review session and its decision state machine
//! - `prefetch`: Next-page trigger
//! - `gesture`: Swipe gesture translation
//! - `spotify_client`: Spotify Web API backed catalog

mod types;
mod error;
mod catalog;
mod buffer;
mod session;
mod prefetch;
mod gesture;
mod spotify_client;

// Re-export all public types for convenient access
pub use types::{Collection, Decision, FetchedPage, Item, Outcome, PageRequest, Source};

pub use error::ReviewError;

pub use catalog::{CatalogClient, delete_item, fetch_page};

pub use session::{ExhaustedReason, ReviewStatus, Session, SessionSnapshot};

pub use prefetch::PrefetchController;

pub use gesture::{CardTransform, GestureTranslator, Release, SwipeDirection, SwipeIntent, SwipeTarget};

pub use spotify_client::SpotifyClient;

#[cfg(test)]
pub(crate) use catalog::fake;
