//! Shared fixtures for lifecycle integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use travel_advice_core::action::Actor;
use travel_advice_core::country::Country;
use travel_advice_core::edition::{Edition, EditionState};
use travel_advice_core::memory::MemoryEditionStore;
use travel_advice_core::testing::{FakeAssetManager, FixedClock, RecordingPublishingApi};
use travel_advice_core::types::Timestamp;
use travel_advice_core::EditionLifecycle;

pub const ALBANIA_CONTENT_ID: &str = "2a3938e1-d588-45fc-8c8f-0f51814d5409";
pub const ARUBA_CONTENT_ID: &str = "56bae85b-a57c-4ca2-9dbd-68361a086bb3";
pub const ALGERIA_CONTENT_ID: &str = "b5c8e64b-3461-4447-9144-1588e4a84fe6";

pub struct Harness {
    pub lifecycle: EditionLifecycle,
    pub store: MemoryEditionStore,
    pub publishing: Arc<RecordingPublishingApi>,
    pub assets: Arc<FakeAssetManager>,
    pub clock: Arc<FixedClock>,
}

pub fn start_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 4, 1, 9, 0, 0).unwrap()
}

pub fn countries() -> Vec<Country> {
    vec![
        Country::new("albania", ALBANIA_CONTENT_ID, "Albania"),
        Country::new("aruba", ARUBA_CONTENT_ID, "Aruba"),
        Country::new("algeria", ALGERIA_CONTENT_ID, "Algeria"),
    ]
}

pub fn harness() -> Harness {
    let store = MemoryEditionStore::new(countries());
    let publishing = Arc::new(RecordingPublishingApi::new());
    let assets = Arc::new(FakeAssetManager::new());
    let clock = Arc::new(FixedClock::new(start_time()));
    let lifecycle = EditionLifecycle::new(
        Arc::new(store.clone()),
        publishing.clone(),
        assets.clone(),
    )
    .with_clock(clock.clone());

    Harness {
        lifecycle,
        store,
        publishing,
        assets,
        clock,
    }
}

pub fn editor() -> Actor {
    Actor::editor("Joe Bloggs")
}

impl Harness {
    /// Create and publish a first edition for `slug` with a change note.
    pub async fn published_edition(&self, slug: &str) -> Edition {
        let draft = self
            .lifecycle
            .create_initial_edition(slug, &Actor::System)
            .await
            .unwrap();
        let changes = travel_advice_core::changes::EditionChanges {
            change_description: Some("First published".into()),
            ..Default::default()
        };
        self.lifecycle.update_draft(draft.id, changes).await.unwrap();
        self.lifecycle.publish(draft.id, &editor()).await.unwrap()
    }

    /// Per-country slot invariants: at most one draft and one published.
    pub async fn assert_invariants(&self) {
        for country in countries() {
            let editions = self.lifecycle.editions(&country.slug).await.unwrap();
            let drafts = editions.iter().filter(|e| e.state == EditionState::Draft).count();
            let published = editions
                .iter()
                .filter(|e| e.state == EditionState::Published)
                .count();
            assert!(drafts <= 1, "{} has {drafts} drafts", country.slug);
            assert!(published <= 1, "{} has {published} published", country.slug);
        }
    }
}
