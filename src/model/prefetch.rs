//! Decides when the next page of a session must be requested

use super::session::Session;
use super::types::PageRequest;
use crate::config::ReviewConfig;

/// Requests the next page while a few tracks are still left to review
#[derive(Clone, Copy, Debug)]
pub struct PrefetchController {
    batch_size: u32,
    preload_threshold: usize,
}

impl PrefetchController {
    pub fn new(config: &ReviewConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            preload_threshold: config.preload_threshold,
        }
    }

    pub fn first_page(&self) -> PageRequest {
        PageRequest {
            limit: self.batch_size,
            offset: 0,
        }
    }

    /// The page to request now, if any.
    ///
    /// Nothing is requested before the first decision while the first batch
    /// still has tracks to show. A first page without a single playable
    /// track is followed up right away. A pending load blocks another.
    pub fn evaluate(&self, session: &Session) -> Option<PageRequest> {
        let due = !session.is_loading()
            && !session.is_loading_more()
            && session.remaining() <= self.preload_threshold
            && (session.position() > 0 || session.remaining() == 0)
            && session.has_more_pages();

        due.then(|| PageRequest {
            limit: self.batch_size,
            offset: session.next_offset() as u32,
        })
    }
}
