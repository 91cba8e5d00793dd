//! Controller module - Review flow logic and event handling
//!
//! This module contains the review controller that owns the active session,
//! starts catalog calls in the background and applies their results.
//! It is organized into submodules by responsibility:
//!
//! - `review`: Source selection, decisions, prefetching and catalog events
//! - `input`: Key and mouse handling, including the swipe gesture

mod review;
mod input;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::config::AppConfig;
use crate::model::{
    CatalogClient, Collection, FetchedPage, GestureTranslator, PageRequest, PrefetchController, ReviewError,
    Session, SessionSnapshot, Source, SwipeIntent, SwipeTarget,
};

pub use input::DragState;

/// Completion of a background catalog call.
///
/// Session-bound events carry the generation of the session that started
/// them so results for a replaced session can be dropped.
#[derive(Debug)]
pub enum EngineEvent {
    PageLoaded {
        generation: u64,
        first_page: bool,
        request: PageRequest,
        result: Result<FetchedPage, ReviewError>,
    },
    ItemDeleted {
        generation: u64,
        item_id: String,
        result: Result<(), ReviewError>,
    },
    CollectionsLoaded(anyhow::Result<Vec<Collection>>),
}

/// Picker and shutdown state of the terminal front-end
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub picker_selected: usize,
    pub should_quit: bool,
}

pub struct ReviewController<C: CatalogClient> {
    client: Arc<C>,
    prefetch: PrefetchController,
    session: Session,
    collections: Vec<Collection>,
    pub(crate) ui: UiState,
    pub(crate) gesture: GestureTranslator,
    pub(crate) drag: Option<DragState>,
    events_tx: UnboundedSender<EngineEvent>,
    events_rx: UnboundedReceiver<EngineEvent>,
    intents_tx: UnboundedSender<SwipeIntent>,
    intents_rx: UnboundedReceiver<SwipeIntent>,
}

impl<C: CatalogClient> ReviewController<C> {
    /// Create the controller and start loading liked songs.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(client: Arc<C>, config: &AppConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();

        let mut controller = Self {
            client,
            prefetch: PrefetchController::new(&config.review),
            session: Session::new(0, Source::Liked),
            collections: vec![Collection::liked()],
            ui: UiState::default(),
            gesture: GestureTranslator::new(config.gesture.clone()),
            drag: None,
            events_tx,
            events_rx,
            intents_tx,
            intents_rx,
        };
        controller.select_source(Source::Liked);
        controller
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Picker entries, liked songs first
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui
    }

    pub fn gesture(&self) -> &GestureTranslator {
        &self.gesture
    }

    /// Sender for decisions coming from the swipe gesture
    pub fn intent_sender(&self) -> UnboundedSender<SwipeIntent> {
        self.intents_tx.clone()
    }

    /// Advance the swipe animation by one frame and apply everything that arrived
    pub fn tick(&mut self, dt: Duration) {
        if let Some(intent) = self.gesture.advance(dt) {
            let _ = self.intents_tx.send(intent);
        }
        self.drain();
    }

    /// Apply every pending catalog event and swipe intent without waiting
    pub fn drain(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
        while let Ok(intent) = self.intents_rx.try_recv() {
            self.handle_intent(intent);
        }
    }

    /// Wait for the next catalog event or swipe intent and apply it
    pub async fn process_next(&mut self) {
        tokio::select! {
            Some(event) = self.events_rx.recv() => self.handle_event(event),
            Some(intent) = self.intents_rx.recv() => self.handle_intent(intent),
        }
    }

    /// The card currently on screen, as a swipe target
    pub(crate) fn swipe_target(&self) -> Option<SwipeTarget> {
        self.session.current_item().map(|item| SwipeTarget {
            generation: self.session.generation(),
            item_id: item.id.clone(),
        })
    }

    /// Commit a finished swipe, unless the card it was made on is gone
    pub(crate) fn handle_intent(&mut self, intent: SwipeIntent) {
        let target = &intent.target;
        let current = self.session.current_item().map(|item| item.id.as_str());
        if target.generation != self.session.generation() || current != Some(target.item_id.as_str()) {
            tracing::debug!(
                item_id = %target.item_id,
                generation = target.generation,
                "Dropping swipe on a card that is no longer shown"
            );
            return;
        }
        self.commit(intent.outcome);
    }
}
