//! Review session: the state of reviewing one source from start to exhaustion

use super::buffer::ReviewBuffer;
use super::types::{Decision, FetchedPage, Item, Outcome, PageRequest, Source};

/// Why there is nothing left to review
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExhaustedReason {
    /// The source is empty, or its first page could not be loaded
    NoItems,
    /// Every track of the source got a decision
    AllReviewed,
}

impl ExhaustedReason {
    pub fn message(self) -> &'static str {
        match self {
            ExhaustedReason::NoItems => "No tracks found in this playlist.",
            ExhaustedReason::AllReviewed => "All songs reviewed!",
        }
    }
}

/// Where the review flow stands
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewStatus {
    /// The first page is still in flight
    Loading,
    /// No track is available right now, but the source has more
    Idle,
    Reviewing(Item),
    Exhausted(ExhaustedReason),
}

/// Copy of the session state handed to the view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub source: Source,
    pub status: ReviewStatus,
    pub position: usize,
    pub total_count: Option<usize>,
    pub buffered: usize,
    pub loading_more: bool,
}

impl SessionSnapshot {
    pub fn current_item(&self) -> Option<&Item> {
        match &self.status {
            ReviewStatus::Reviewing(item) => Some(item),
            _ => None,
        }
    }

    /// "12 / 100 (50 loaded)"
    pub fn progress_label(&self) -> String {
        let total = self.total_count.unwrap_or(0);
        let mut label = format!("{} / {}", (self.position + 1).min(total), total);
        if self.buffered < total {
            label.push_str(&format!(" ({} loaded)", self.buffered));
        }
        label
    }
}

/// A decision together with the track it was made for
#[derive(Clone, Debug)]
pub struct Committed {
    pub decision: Decision,
    pub item: Item,
}

/// Mutable state of one review session.
///
/// `position` counts committed decisions and never decreases. Tracks confirmed
/// as removed remotely are spliced out of the buffer, so the current track
/// sits at `position - removed`.
///
/// Paging follows the raw remote list rather than the buffer: duplicates and
/// unplayable entries take up remote slots without ever reaching the buffer.
/// `fetch_offset` is where the next unfetched entry sits in the remote list as
/// it is now. It may trail the true position, never lead it; the seen set
/// absorbs any overlap.
#[derive(Debug)]
pub struct Session {
    generation: u64,
    source: Source,
    buffer: ReviewBuffer,
    position: usize,
    removed: usize,
    total_count: Option<usize>,
    loading: bool,
    loading_more: bool,
    decisions: Vec<Decision>,
    fetch_offset: usize,
    /// A page came back short: the remote list has nothing past `fetch_offset`
    drained: bool,
    /// Remote deletes confirmed so far
    deleted: usize,
    /// `deleted` when the outstanding page was requested
    deleted_at_request: usize,
    pending_deletes: usize,
}

impl Session {
    /// A fresh session waiting for its first page
    pub fn new(generation: u64, source: Source) -> Self {
        Self {
            generation,
            source,
            buffer: ReviewBuffer::new(),
            position: 0,
            removed: 0,
            total_count: None,
            loading: true,
            loading_more: false,
            decisions: Vec::new(),
            fetch_offset: 0,
            drained: false,
            deleted: 0,
            deleted_at_request: 0,
            pending_deletes: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Index of the current track in the buffer
    pub fn cursor(&self) -> usize {
        self.position - self.removed
    }

    /// Tracks buffered but not reviewed yet
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.cursor())
    }

    /// Whether the remote list holds entries that were never fetched.
    ///
    /// Confirmed removals shrank the remote list as well, so they are taken
    /// off the reported total.
    pub fn has_more_pages(&self) -> bool {
        match self.total_count {
            Some(total) => !self.drained && self.fetch_offset < total.saturating_sub(self.deleted),
            None => false,
        }
    }

    /// Offset of the next page.
    ///
    /// Deletes still in flight may land before the page is served, so the
    /// request starts early by that many entries.
    pub fn next_offset(&self) -> usize {
        self.fetch_offset.saturating_sub(self.pending_deletes)
    }

    pub fn current_item(&self) -> Option<&Item> {
        if self.loading {
            return None;
        }
        self.buffer.get(self.cursor())
    }

    pub fn status(&self) -> ReviewStatus {
        if self.loading {
            return ReviewStatus::Loading;
        }
        if let Some(item) = self.current_item() {
            return ReviewStatus::Reviewing(item.clone());
        }
        if self.has_more_pages() {
            ReviewStatus::Idle
        } else if self.total_count.unwrap_or(0) == 0 || self.position == 0 {
            // Nothing reviewable ever turned up
            ReviewStatus::Exhausted(ExhaustedReason::NoItems)
        } else {
            ReviewStatus::Exhausted(ExhaustedReason::AllReviewed)
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            source: self.source.clone(),
            status: self.status(),
            position: self.position,
            total_count: self.total_count,
            buffered: self.buffer.len() + self.removed,
            loading_more: self.loading_more,
        }
    }

    /// Replace the buffer with the first page.
    ///
    /// Without a reported total the size of the raw page stands in for it.
    pub fn apply_first_page(&mut self, request: PageRequest, page: FetchedPage) -> usize {
        self.loading = false;
        let reported = page.total.map(|t| t as usize).unwrap_or(page.items.len());
        self.total_count = Some(reported);
        self.advance_fetch(request, page.items.len());

        let admitted = self.buffer.replace(page.items);
        self.clamp_total();
        admitted
    }

    /// The first page failed: the session stays empty
    pub fn fail_first_page(&mut self) {
        self.loading = false;
        self.drained = true;
        self.total_count = Some(0);
    }

    /// Mark a prefetch as outstanding
    pub fn begin_prefetch(&mut self) {
        self.loading_more = true;
        self.deleted_at_request = self.deleted;
    }

    /// Append a later page, returning how many tracks were new
    pub fn apply_page(&mut self, request: PageRequest, page: FetchedPage) -> usize {
        self.loading_more = false;
        if let Some(reported) = page.total {
            self.total_count = Some(reported as usize);
        }
        self.advance_fetch(request, page.items.len());

        let admitted = self.buffer.append(page.items);
        self.clamp_total();
        admitted
    }

    pub fn fail_page(&mut self) {
        self.loading_more = false;
    }

    fn advance_fetch(&mut self, request: PageRequest, raw_len: usize) {
        // Deletes confirmed while the page was out may already be reflected
        // in it; assuming they are only ever causes overlap
        let landed = self.deleted - self.deleted_at_request;
        self.fetch_offset = (request.offset as usize + raw_len).saturating_sub(landed);

        if raw_len < request.limit as usize {
            if !self.drained {
                tracing::debug!(
                    source = %self.source,
                    fetched = self.fetch_offset,
                    "Reached the end of the source"
                );
            }
            self.drained = true;
            // Short page: the entries seen so far are all there is
            self.total_count = Some(self.fetch_offset + self.deleted);
        }
    }

    fn clamp_total(&mut self) {
        let floor = self.buffer.len() + self.removed;
        self.total_count = self.total_count.map(|total| total.max(floor));
    }

    /// Record `outcome` for the current track and move past it.
    ///
    /// Returns `None` when no track is under review.
    pub fn commit(&mut self, outcome: Outcome) -> Option<Committed> {
        let item = self.current_item()?.clone();
        let decision = Decision {
            item_id: item.id.clone(),
            outcome,
            committed_at: self.decisions.len() as u64,
        };
        self.decisions.push(decision.clone());
        self.position += 1;
        if outcome == Outcome::Remove {
            self.pending_deletes += 1;
        }
        Some(Committed { decision, item })
    }

    /// Drop a reviewed track after its remote removal succeeded
    pub fn confirm_removed(&mut self, item_id: &str) -> bool {
        self.pending_deletes = self.pending_deletes.saturating_sub(1);
        self.deleted += 1;
        self.fetch_offset = self.fetch_offset.saturating_sub(1);

        let cursor = self.cursor();
        match self.buffer.remove(item_id) {
            Some(index) if index < cursor => {
                self.removed += 1;
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// A remote removal failed; the track stays in the remote list
    pub fn delete_failed(&mut self) {
        self.pending_deletes = self.pending_deletes.saturating_sub(1);
    }
}
