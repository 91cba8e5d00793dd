//! Source selection, decisions and catalog events

use std::sync::Arc;

use crate::model::{
    CatalogClient, Collection, Decision, Outcome, PageRequest, Session, Source, delete_item,
    fetch_page,
};
use super::{EngineEvent, ReviewController};

impl<C: CatalogClient> ReviewController<C> {
    /// Start reviewing `source` from scratch.
    ///
    /// Results of calls made for the previous session are ignored from now on.
    pub fn select_source(&mut self, source: Source) {
        let generation = self.session.generation() + 1;
        tracing::info!(source = %source, generation, "Starting review session");

        self.session = Session::new(generation, source);
        self.spawn_fetch(self.prefetch.first_page(), true);
    }

    pub fn load_collections(&self) {
        let client = Arc::clone(&self.client);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = client.list_collections().await;
            let _ = events.send(EngineEvent::CollectionsLoaded(result));
        });
    }

    /// Commit `outcome` for the current track and move on.
    ///
    /// Used by the gesture (through its intent channel) and by the buttons
    /// alike. A removal is applied optimistically: the position advances now
    /// and the remote delete runs in the background.
    pub fn commit(&mut self, outcome: Outcome) -> Option<Decision> {
        let committed = self.session.commit(outcome)?;
        let item = &committed.item;

        match outcome {
            Outcome::Keep => {
                tracing::info!(item_id = %item.id, track = %item.name, "Keeping track");
            }
            Outcome::Remove => {
                tracing::info!(item_id = %item.id, track = %item.name, "Removing track");
                self.spawn_delete(item.id.clone(), item.uri.clone());
            }
        }

        self.maybe_prefetch();
        Some(committed.decision)
    }

    pub(crate) fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::PageLoaded {
                generation,
                first_page,
                request,
                result,
            } => {
                if generation != self.session.generation() {
                    tracing::debug!(generation, "Discarding page of a replaced session");
                    return;
                }

                match result {
                    Ok(page) => {
                        let admitted = if first_page {
                            self.session.apply_first_page(request, page)
                        } else {
                            self.session.apply_page(request, page)
                        };
                        tracing::info!(
                            source = %self.session.source(),
                            admitted,
                            buffered = self.session.buffered(),
                            total = ?self.session.total_count(),
                            "Loaded tracks"
                        );
                        // A page of duplicates or unplayable entries still
                        // moves the fetch offset, so this cannot spin
                        self.maybe_prefetch();
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Error loading tracks");
                        if first_page {
                            self.session.fail_first_page();
                        } else {
                            self.session.fail_page();
                        }
                    }
                }
            }
            EngineEvent::ItemDeleted {
                generation,
                item_id,
                result,
            } => {
                if generation != self.session.generation() {
                    tracing::debug!(generation, item_id = %item_id, "Ignoring removal for a replaced session");
                    return;
                }

                match result {
                    Ok(()) => {
                        self.session.confirm_removed(&item_id);
                        self.maybe_prefetch();
                    }
                    // The advance is not rolled back; a reload of the source
                    // brings the track back
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to remove track");
                        self.session.delete_failed();
                    }
                }
            }
            EngineEvent::CollectionsLoaded(result) => match result {
                Ok(collections) => {
                    tracing::info!(count = collections.len(), "Loaded playlists");
                    self.collections = std::iter::once(Collection::liked())
                        .chain(collections)
                        .collect();
                }
                Err(e) => tracing::error!(error = %e, "Error loading playlists"),
            },
        }
    }

    fn maybe_prefetch(&mut self) {
        if let Some(request) = self.prefetch.evaluate(&self.session) {
            tracing::debug!(offset = request.offset, limit = request.limit, "Prefetching tracks");
            self.session.begin_prefetch();
            self.spawn_fetch(request, false);
        }
    }

    fn spawn_fetch(&self, request: PageRequest, first_page: bool) {
        let client = Arc::clone(&self.client);
        let events = self.events_tx.clone();
        let source = self.session.source().clone();
        let generation = self.session.generation();

        tokio::spawn(async move {
            let result = fetch_page(client.as_ref(), &source, request, first_page).await;
            let _ = events.send(EngineEvent::PageLoaded {
                generation,
                first_page,
                request,
                result,
            });
        });
    }

    fn spawn_delete(&self, item_id: String, item_uri: String) {
        let client = Arc::clone(&self.client);
        let events = self.events_tx.clone();
        let source = self.session.source().clone();
        let generation = self.session.generation();

        tokio::spawn(async move {
            let result = delete_item(client.as_ref(), &source, &item_id, &item_uri).await;
            let _ = events.send(EngineEvent::ItemDeleted {
                generation,
                item_id,
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::AppConfig;
    use crate::controller::ReviewController;
    use crate::model::fake::{FakeCatalog, track, tracks};
    use crate::model::{ExhaustedReason, Outcome, ReviewStatus, Source, SwipeIntent};

    async fn loaded(catalog: FakeCatalog) -> (Arc<FakeCatalog>, ReviewController<FakeCatalog>) {
        let catalog = Arc::new(catalog);
        let mut controller = ReviewController::new(Arc::clone(&catalog), &AppConfig::default());
        controller.process_next().await;
        (catalog, controller)
    }

    fn current_id(controller: &ReviewController<FakeCatalog>) -> Option<String> {
        controller.snapshot().current_item().map(|item| item.id.clone())
    }

    #[tokio::test]
    async fn test_initial_load_of_liked_songs() {
        let (_, controller) = loaded(FakeCatalog::with_liked(tracks("l", 30))).await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.source, Source::Liked);
        assert_eq!(snapshot.buffered, 25);
        assert_eq!(snapshot.total_count, Some(30));
        assert_eq!(snapshot.position, 0);
        assert!(!snapshot.loading_more);
        assert_eq!(current_id(&controller).as_deref(), Some("l0"));
    }

    #[tokio::test]
    async fn test_empty_liked_songs_is_exhausted() {
        let (_, controller) = loaded(FakeCatalog::default()).await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.status, ReviewStatus::Exhausted(ExhaustedReason::NoItems));
        assert!(snapshot.current_item().is_none());
    }

    #[tokio::test]
    async fn test_failed_initial_load_shows_no_tracks() {
        let catalog = FakeCatalog::with_liked(tracks("l", 3));
        catalog.set_failing(true);
        let (_, controller) = loaded(catalog).await;

        assert_eq!(
            controller.snapshot().status,
            ReviewStatus::Exhausted(ExhaustedReason::NoItems)
        );
    }

    #[tokio::test]
    async fn test_prefetch_before_buffer_runs_out() {
        let (catalog, mut controller) = loaded(FakeCatalog::with_liked(tracks("l", 100))).await;

        for _ in 0..19 {
            controller.commit(Outcome::Keep);
        }
        assert!(!controller.snapshot().loading_more);

        controller.commit(Outcome::Keep);
        assert!(controller.snapshot().loading_more);
        controller.commit(Outcome::Keep);
        assert_eq!(controller.snapshot().position, 21);

        controller.process_next().await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.buffered, 50);
        assert!(!snapshot.loading_more);
        assert_eq!(
            catalog
                .calls()
                .iter()
                .filter(|call| call.starts_with("list_default_items"))
                .collect::<Vec<_>>(),
            vec!["list_default_items(25, 0)", "list_default_items(25, 25)"]
        );
    }

    #[tokio::test]
    async fn test_reviews_every_track_exactly_once() {
        let (_, mut controller) = loaded(FakeCatalog::with_liked(tracks("l", 60))).await;
        let mut reviewed = Vec::new();

        loop {
            while let Some(decision) = controller.commit(Outcome::Keep) {
                reviewed.push(decision.item_id);
            }
            if !controller.snapshot().loading_more {
                break;
            }
            controller.process_next().await;
        }

        let expected: Vec<String> = (0..60).map(|i| format!("l{}", i)).collect();
        assert_eq!(reviewed, expected);
        assert_eq!(
            controller.snapshot().status,
            ReviewStatus::Exhausted(ExhaustedReason::AllReviewed)
        );
    }

    #[tokio::test]
    async fn test_duplicate_across_pages_admitted_once() {
        let mut liked = tracks("l", 25);
        liked.push(track("l3"));
        liked.extend(tracks("m", 4));
        let (_, mut controller) = loaded(FakeCatalog::with_liked(liked)).await;

        for _ in 0..20 {
            controller.commit(Outcome::Keep);
        }
        controller.process_next().await;

        assert_eq!(controller.session().buffered(), 29);
        assert_eq!(controller.snapshot().total_count, Some(30));
    }

    #[tokio::test]
    async fn test_remove_deletes_remotely_and_keeps_order() {
        let (catalog, mut controller) = loaded(FakeCatalog::with_liked(tracks("l", 3))).await;

        let decision = controller.commit(Outcome::Remove).unwrap();
        assert_eq!(decision.item_id, "l0");
        assert_eq!(current_id(&controller).as_deref(), Some("l1"));

        controller.process_next().await;
        assert!(catalog.calls().contains(&"delete_default_item(l0)".to_string()));
        assert_eq!(catalog.liked_ids(), vec!["l1", "l2"]);
        assert_eq!(controller.session().buffered(), 2);
        assert_eq!(current_id(&controller).as_deref(), Some("l1"));

        controller.commit(Outcome::Keep);
        assert_eq!(current_id(&controller).as_deref(), Some("l2"));
    }

    #[tokio::test]
    async fn test_failed_delete_does_not_roll_back() {
        let catalog = FakeCatalog::with_liked(tracks("l", 3));
        catalog.set_failing_deletes(true);
        let (_, mut controller) = loaded(catalog).await;

        controller.commit(Outcome::Remove);
        controller.process_next().await;

        assert_eq!(controller.snapshot().position, 1);
        assert_eq!(controller.session().buffered(), 3);
        assert_eq!(current_id(&controller).as_deref(), Some("l1"));
    }

    #[tokio::test]
    async fn test_playlist_removal_uses_track_uri() {
        let catalog = FakeCatalog::default();
        catalog.add_playlist("mix", tracks("p", 2));
        let (catalog, mut controller) = loaded(catalog).await;

        controller.select_source(Source::playlist("mix"));
        controller.process_next().await;
        controller.commit(Outcome::Remove);
        controller.process_next().await;

        assert!(
            catalog
                .calls()
                .contains(&"delete_collection_item(mix, spotify:track:p0)".to_string())
        );
    }

    #[tokio::test]
    async fn test_stale_page_is_discarded() {
        let catalog = FakeCatalog::with_liked(tracks("l", 5));
        catalog.add_playlist("mix", tracks("p", 2));
        let catalog = Arc::new(catalog);
        let mut controller = ReviewController::new(Arc::clone(&catalog), &AppConfig::default());

        // The liked songs page is still in flight
        controller.select_source(Source::playlist("mix"));
        controller.process_next().await;
        controller.process_next().await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.source, Source::playlist("mix"));
        assert_eq!(snapshot.buffered, 2);
        assert_eq!(snapshot.total_count, Some(2));
        assert_eq!(current_id(&controller).as_deref(), Some("p0"));
    }

    #[tokio::test]
    async fn test_switching_source_resets_session() {
        let catalog = FakeCatalog::with_liked(tracks("l", 5));
        catalog.add_playlist("mix", tracks("l", 3));
        let (_, mut controller) = loaded(catalog).await;
        controller.commit(Outcome::Keep);
        controller.commit(Outcome::Keep);

        controller.select_source(Source::playlist("mix"));
        assert_eq!(controller.snapshot().status, ReviewStatus::Loading);
        controller.process_next().await;

        // Same ids as the liked songs, admitted again in the new session
        assert_eq!(controller.snapshot().position, 0);
        assert_eq!(controller.session().buffered(), 3);
        assert!(controller.session().decisions().is_empty());
    }

    #[tokio::test]
    async fn test_empty_playlist_has_no_tracks() {
        let catalog = FakeCatalog::default();
        catalog.add_playlist("empty", Vec::new());
        let (catalog, mut controller) = loaded(catalog).await;

        controller.select_source(Source::playlist("empty"));
        controller.process_next().await;

        assert_eq!(
            controller.snapshot().status,
            ReviewStatus::Exhausted(ExhaustedReason::NoItems)
        );
        assert!(!catalog.calls().contains(&"collection_total(empty)".to_string()));
    }

    #[tokio::test]
    async fn test_collections_start_with_liked_songs() {
        let catalog = FakeCatalog::default();
        catalog.add_playlist("b", Vec::new());
        catalog.add_playlist("a", Vec::new());
        let (_, mut controller) = loaded(catalog).await;

        controller.load_collections();
        controller.process_next().await;

        let names: Vec<_> = controller.collections().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Liked Songs", "Playlist a", "Playlist b"]);
    }

    #[tokio::test]
    async fn test_swipe_intents_go_through_the_channel() {
        let (catalog, mut controller) = loaded(FakeCatalog::with_liked(tracks("l", 3))).await;

        let target = controller.swipe_target().unwrap();
        controller.gesture.grant(target);
        controller.gesture.sample(-100.0, 0.0);
        controller.gesture.release(-150.0, 0.0);

        controller.tick(Duration::from_millis(100));
        assert_eq!(controller.snapshot().position, 0);

        controller.tick(Duration::from_millis(250));
        assert_eq!(controller.snapshot().position, 1);
        assert_eq!(controller.session().decisions()[0].outcome, Outcome::Remove);

        controller.process_next().await;
        assert!(catalog.calls().contains(&"delete_default_item(l0)".to_string()));

        controller
            .intent_sender()
            .send(SwipeIntent {
                outcome: Outcome::Keep,
                target: controller.swipe_target().unwrap(),
            })
            .unwrap();
        controller.process_next().await;
        assert_eq!(controller.snapshot().position, 2);
    }

    #[tokio::test]
    async fn test_swipe_in_flight_is_dropped_on_source_change() {
        let catalog = FakeCatalog::with_liked(tracks("l", 3));
        catalog.add_playlist("mix", tracks("p", 3));
        let (catalog, mut controller) = loaded(catalog).await;

        let target = controller.swipe_target().unwrap();
        controller.gesture.grant(target);
        controller.gesture.release(-150.0, 0.0);

        controller.select_source(Source::playlist("mix"));
        controller.process_next().await;
        controller.tick(Duration::from_millis(400));

        assert!(controller.session().decisions().is_empty());
        assert_eq!(current_id(&controller).as_deref(), Some("p0"));
        assert!(!catalog.calls().iter().any(|call| call.starts_with("delete_")));
    }

    #[tokio::test]
    async fn test_swipe_for_a_card_already_decided_is_dropped() {
        let (_, mut controller) = loaded(FakeCatalog::with_liked(tracks("l", 3))).await;
        let target = controller.swipe_target().unwrap();
        controller.commit(Outcome::Keep);

        controller
            .intent_sender()
            .send(SwipeIntent {
                outcome: Outcome::Remove,
                target,
            })
            .unwrap();
        controller.process_next().await;

        assert_eq!(controller.snapshot().position, 1);
        assert_eq!(current_id(&controller).as_deref(), Some("l1"));
    }

    #[tokio::test]
    async fn test_stale_removal_is_ignored() {
        let catalog = FakeCatalog::with_liked(tracks("l", 3));
        catalog.add_playlist("mix", tracks("p", 30));
        let (catalog, mut controller) = loaded(catalog).await;

        controller.commit(Outcome::Remove);
        controller.select_source(Source::playlist("mix"));
        controller.process_next().await;
        controller.process_next().await;

        // The liked song is gone remotely, the new session is untouched
        assert_eq!(catalog.liked_ids(), vec!["l1", "l2"]);
        assert_eq!(controller.session().buffered(), 25);
        assert_eq!(controller.session().next_offset(), 25);
        assert_eq!(current_id(&controller).as_deref(), Some("p0"));
    }

    async fn review_to_end(controller: &mut ReviewController<FakeCatalog>) -> Vec<String> {
        let mut reviewed = Vec::new();
        loop {
            while let Some(decision) = controller.commit(Outcome::Keep) {
                reviewed.push(decision.item_id);
            }
            if !controller.snapshot().loading_more {
                break;
            }
            controller.process_next().await;
        }
        reviewed
    }

    #[tokio::test]
    async fn test_source_with_duplicates_runs_to_the_end() {
        let mut liked = tracks("l", 25);
        liked.push(track("l3"));
        liked.extend(tracks("m", 4));
        let (catalog, mut controller) = loaded(FakeCatalog::with_liked(liked)).await;

        let reviewed = review_to_end(&mut controller).await;

        assert_eq!(reviewed.len(), 29);
        assert_eq!(
            controller.snapshot().status,
            ReviewStatus::Exhausted(ExhaustedReason::AllReviewed)
        );
        let pages = catalog
            .calls()
            .into_iter()
            .filter(|call| call.starts_with("list_default_items"))
            .count();
        assert_eq!(pages, 2);
    }

    #[tokio::test]
    async fn test_playlist_opening_with_unplayable_entries() {
        let mut items = vec![Default::default(); 25];
        items.extend(tracks("p", 3));
        let catalog = FakeCatalog::default();
        catalog.add_playlist("mix", items);
        let (catalog, mut controller) = loaded(catalog).await;

        controller.select_source(Source::playlist("mix"));
        controller.process_next().await;
        assert_eq!(controller.snapshot().status, ReviewStatus::Idle);
        assert!(controller.snapshot().loading_more);

        controller.process_next().await;
        assert_eq!(current_id(&controller).as_deref(), Some("p0"));
        assert!(
            catalog
                .calls()
                .contains(&"list_collection_items(mix, 25, 25)".to_string())
        );

        let reviewed = review_to_end(&mut controller).await;
        assert_eq!(reviewed, vec!["p0", "p1", "p2"]);
        assert_eq!(
            controller.snapshot().status,
            ReviewStatus::Exhausted(ExhaustedReason::AllReviewed)
        );
    }

    #[tokio::test]
    async fn test_overstated_total_ends_on_short_page() {
        let catalog = FakeCatalog::with_liked(tracks("l", 30));
        catalog.report_total(Source::Liked, 40);
        let (_, mut controller) = loaded(catalog).await;
        assert_eq!(controller.snapshot().total_count, Some(40));

        let reviewed = review_to_end(&mut controller).await;

        assert_eq!(reviewed.len(), 30);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.total_count, Some(30));
        assert_eq!(snapshot.status, ReviewStatus::Exhausted(ExhaustedReason::AllReviewed));
    }

    #[tokio::test]
    async fn test_removal_racing_prefetch_skips_nothing() {
        let (_, mut controller) = loaded(FakeCatalog::with_liked(tracks("l", 100))).await;

        let mut reviewed = vec![controller.commit(Outcome::Remove).unwrap().item_id];
        reviewed.extend(review_to_end(&mut controller).await);

        let expected: Vec<String> = (0..100).map(|i| format!("l{}", i)).collect();
        assert_eq!(reviewed, expected);
        assert_eq!(
            controller.snapshot().status,
            ReviewStatus::Exhausted(ExhaustedReason::AllReviewed)
        );
    }

    #[tokio::test]
    async fn test_commit_while_loading_is_ignored() {
        let catalog = Arc::new(FakeCatalog::with_liked(tracks("l", 3)));
        let mut controller = ReviewController::new(catalog, &AppConfig::default());

        assert!(controller.commit(Outcome::Keep).is_none());
        assert_eq!(controller.snapshot().position, 0);
    }
}
