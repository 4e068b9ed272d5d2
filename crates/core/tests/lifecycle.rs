//! End-to-end lifecycle scenarios against the in-memory store.

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use travel_advice_core::action::{ActionType, Actor, SYSTEM_ACTOR_NAME};
use travel_advice_core::clock::Clock;
use travel_advice_core::changes::{AssetChange, EditionChanges};
use travel_advice_core::edition::{AlertStatus, AssetRef, EditionState};
use travel_advice_core::error::CoreError;
use travel_advice_core::parts::PartInput;
use travel_advice_core::payload::UpdateType;
use travel_advice_core::publishing::AssetUpload;
use travel_advice_core::store::EditionStore;
use travel_advice_core::testing::PublishingCall;

use common::{editor, harness, ALBANIA_CONTENT_ID};

fn two_parts() -> EditionChanges {
    EditionChanges {
        parts: Some(vec![
            PartInput::new("Part One", "Body text", Some("part-one")),
            PartInput::new("Part Two", "Body text", Some("part-two")),
        ]),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_edition_uses_country_defaults() {
    let h = harness();

    let draft = h
        .lifecycle
        .create_initial_edition("albania", &Actor::System)
        .await
        .unwrap();

    assert_eq!(draft.version_number, 1);
    assert_eq!(draft.state, EditionState::Draft);
    assert_eq!(draft.title, "Albania travel advice");
    assert!(draft.parts.is_empty());

    let actions = h.lifecycle.actions(draft.id).await.unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].request_type, ActionType::NewVersion);
    assert_eq!(actions[0].requester, SYSTEM_ACTOR_NAME);
}

#[tokio::test]
async fn initial_edition_for_unknown_country_is_not_found() {
    let h = harness();
    let result = h.lifecycle.create_initial_edition("narnia", &editor()).await;
    assert_matches!(result, Err(CoreError::NotFound { entity: "country", .. }));
}

#[tokio::test]
async fn second_draft_for_country_is_a_conflict() {
    let h = harness();
    let first = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();

    assert_matches!(
        h.lifecycle.create_initial_edition("albania", &editor()).await,
        Err(CoreError::Conflict(_))
    );
    assert_matches!(
        h.lifecycle.create_new_version(first.id, &editor()).await,
        Err(CoreError::Conflict(_))
    );
    assert!(!h.lifecycle.can_create_new_version("albania").await.unwrap());
    assert_eq!(h.lifecycle.editions("albania").await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_replaces_content_and_derives_slugs() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();

    let changes = EditionChanges {
        summary: Some("## Summary\n\nStay safe".into()),
        alert_status: Some(vec![
            AlertStatus::AvoidAllTravelToWholeCountry,
            AlertStatus::AvoidAllButEssentialTravelToParts,
        ]),
        parts: Some(vec![
            PartInput::new("Safety and security", "Crime is low", None),
            PartInput::new("Entry requirements", "Visas", None),
        ]),
        ..Default::default()
    };
    let saved = h.lifecycle.update_draft(draft.id, changes).await.unwrap();

    let slugs: Vec<&str> = saved.parts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, ["safety-and-security", "entry-requirements"]);
    assert_eq!(saved.alert_status.len(), 2);
    assert_eq!(saved.lock_version, draft.lock_version + 1);

    let reloaded = h.lifecycle.edition(draft.id).await.unwrap();
    assert_eq!(reloaded, saved);
}

#[tokio::test]
async fn invalid_part_leaves_stored_parts_unchanged() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();
    h.lifecycle.update_draft(draft.id, two_parts()).await.unwrap();

    let changes = EditionChanges {
        title: Some("New title".into()),
        parts: Some(vec![
            PartInput::new("Part One", "Body text", Some("part-one")),
            PartInput::new("", "Body text", Some("part-two")),
        ]),
        ..Default::default()
    };
    let err = h.lifecycle.update_draft(draft.id, changes).await.unwrap_err();
    assert_matches!(&err, CoreError::InvalidParts(invalid) if invalid.len() == 1);

    let reloaded = h.lifecycle.edition(draft.id).await.unwrap();
    assert_eq!(reloaded.title, "Albania travel advice");
    assert_eq!(reloaded.parts.len(), 2);
    assert_eq!(reloaded.parts[1].title, "Part Two");
}

#[tokio::test]
async fn omitted_parts_are_removed_on_save() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();
    h.lifecycle.update_draft(draft.id, two_parts()).await.unwrap();

    let changes = EditionChanges {
        parts: Some(vec![PartInput::new("Part Two", "Body text", Some("part-two"))]),
        ..Default::default()
    };
    let saved = h.lifecycle.update_draft(draft.id, changes).await.unwrap();
    assert_eq!(saved.parts.len(), 1);
    assert_eq!(saved.parts[0].slug, "part-two");
}

#[tokio::test]
async fn stale_lock_version_is_a_conflict() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();
    h.lifecycle.update_draft(draft.id, two_parts()).await.unwrap();

    let changes = EditionChanges {
        title: Some("Edited from a stale tab".into()),
        lock_version: Some(draft.lock_version),
        ..Default::default()
    };
    assert_matches!(
        h.lifecycle.update_draft(draft.id, changes).await,
        Err(CoreError::Conflict(_))
    );
}

#[tokio::test]
async fn first_version_cannot_be_minor_update() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();

    let changes = EditionChanges {
        minor_update: Some(true),
        ..Default::default()
    };
    assert_matches!(
        h.lifecycle.update_draft(draft.id, changes).await,
        Err(CoreError::Validation(_))
    );
}

// ---------------------------------------------------------------------------
// Publishing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn albania_major_then_minor_publish() {
    let h = harness();

    // v1: draft, parts, major publish.
    let v1 = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();
    let mut changes = two_parts();
    changes.change_description = Some("Made changes to all the stuff".into());
    h.lifecycle.update_draft(v1.id, changes).await.unwrap();

    let published_v1 = h.lifecycle.publish(v1.id, &editor()).await.unwrap();
    let first_published_at = h.clock.now();
    assert_eq!(published_v1.state, EditionState::Published);
    assert_eq!(published_v1.published_at, Some(first_published_at));

    let payload = h.publishing.last_payload(ALBANIA_CONTENT_ID).unwrap();
    assert_eq!(payload.base_path, "/foreign-travel-advice/albania");
    assert_eq!(payload.update_type, UpdateType::Major);
    assert_eq!(payload.details["parts"].as_array().unwrap().len(), 2);

    // v2: copy, minor publish a day later.
    h.clock.advance(Duration::days(1));
    let v2 = h.lifecycle.create_new_version(v1.id, &editor()).await.unwrap();
    assert_eq!(v2.version_number, 2);
    assert_eq!(v2.parts, published_v1.parts);
    assert!(v2.change_description.is_empty());

    let changes = EditionChanges {
        minor_update: Some(true),
        ..Default::default()
    };
    h.lifecycle.update_draft(v2.id, changes).await.unwrap();
    let published_v2 = h.lifecycle.publish(v2.id, &editor()).await.unwrap();

    assert_eq!(published_v2.published_at, Some(first_published_at));
    assert_eq!(published_v2.change_description, "Made changes to all the stuff");
    assert_eq!(
        h.lifecycle.edition(v1.id).await.unwrap().state,
        EditionState::Archived
    );

    let publishes: Vec<UpdateType> = h
        .publishing
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            PublishingCall::Publish { update_type, .. } => Some(update_type),
            PublishingCall::PutContent { .. } => None,
        })
        .collect();
    assert_eq!(publishes, [UpdateType::Major, UpdateType::Minor]);

    h.assert_invariants().await;
}

#[tokio::test]
async fn major_publish_requires_change_description() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();

    assert_matches!(
        h.lifecycle.publish(draft.id, &editor()).await,
        Err(CoreError::Validation(_))
    );
    assert!(h.publishing.calls().is_empty());
    assert!(h.lifecycle.edition(draft.id).await.unwrap().is_draft());
}

#[tokio::test]
async fn publishing_archives_only_the_same_country() {
    let h = harness();
    let albania = h.published_edition("albania").await;
    let aruba = h.published_edition("aruba").await;

    let v2 = h
        .lifecycle
        .create_new_version(albania.id, &editor())
        .await
        .unwrap();
    let changes = EditionChanges {
        change_description: Some("Updated the summary".into()),
        ..Default::default()
    };
    h.lifecycle.save_and_publish(v2.id, changes, &editor()).await.unwrap();

    assert_eq!(
        h.lifecycle.edition(albania.id).await.unwrap().state,
        EditionState::Archived
    );
    assert_eq!(
        h.lifecycle.edition(aruba.id).await.unwrap().state,
        EditionState::Published
    );
    h.assert_invariants().await;
}

#[tokio::test]
async fn published_edition_is_read_only() {
    let h = harness();
    let published = h.published_edition("albania").await;

    let changes = EditionChanges {
        title: Some("Too late".into()),
        ..Default::default()
    };
    let err = h
        .lifecycle
        .update_draft(published.id, changes)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        CoreError::InvalidState {
            state: EditionState::Published,
            action: "edit",
            ..
        }
    );
    assert_matches!(
        h.lifecycle.publish(published.id, &editor()).await,
        Err(CoreError::InvalidState { .. })
    );
}

#[tokio::test]
async fn downstream_failure_rolls_back_publish() {
    let h = harness();
    let v1 = h.published_edition("albania").await;
    let v2 = h.lifecycle.create_new_version(v1.id, &editor()).await.unwrap();
    let changes = EditionChanges {
        change_description: Some("New advice".into()),
        ..Default::default()
    };
    h.lifecycle.update_draft(v2.id, changes).await.unwrap();
    let actions_before = h.lifecycle.actions(v2.id).await.unwrap().len();

    h.publishing.fail_with("publishing-api returned 500");
    assert_matches!(
        h.lifecycle.publish(v2.id, &editor()).await,
        Err(CoreError::Publishing(msg)) if msg.contains("500")
    );

    assert_eq!(
        h.lifecycle.edition(v1.id).await.unwrap().state,
        EditionState::Published
    );
    let v2_after = h.lifecycle.edition(v2.id).await.unwrap();
    assert_eq!(v2_after.state, EditionState::Draft);
    assert_eq!(v2_after.published_at, None);
    assert_eq!(h.lifecycle.actions(v2.id).await.unwrap().len(), actions_before);

    // The draft can be published once the downstream service recovers.
    h.publishing.recover();
    let published = h.lifecycle.publish(v2.id, &editor()).await.unwrap();
    assert_eq!(published.state, EditionState::Published);
    h.assert_invariants().await;
}

#[tokio::test]
async fn new_version_can_be_created_from_archived_edition() {
    let h = harness();
    let v1 = h.published_edition("albania").await;
    let v2 = h.lifecycle.create_new_version(v1.id, &editor()).await.unwrap();
    let changes = EditionChanges {
        change_description: Some("Second".into()),
        ..Default::default()
    };
    h.lifecycle.save_and_publish(v2.id, changes, &editor()).await.unwrap();

    let v3 = h.lifecycle.create_new_version(v1.id, &editor()).await.unwrap();
    assert_eq!(v3.version_number, 3);
    assert_eq!(v3.title, v1.title);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_new_versions_create_one_draft() {
    let h = harness();
    let source_id = h.published_edition("albania").await.id;

    let a = h.lifecycle.clone();
    let b = h.lifecycle.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.create_new_version(source_id, &editor()).await }),
        tokio::spawn(async move { b.create_new_version(source_id, &editor()).await }),
    );
    let results = [first.unwrap(), second.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(CoreError::Conflict(_)))));
    h.assert_invariants().await;
}

#[tokio::test]
async fn concurrent_publishes_of_one_draft_succeed_once() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();
    let changes = EditionChanges {
        change_description: Some("First published".into()),
        ..Default::default()
    };
    h.lifecycle.update_draft(draft.id, changes).await.unwrap();

    let id = draft.id;
    let a = h.lifecycle.clone();
    let b = h.lifecycle.clone();
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.publish(id, &editor()).await }),
        tokio::spawn(async move { b.publish(id, &editor()).await }),
    );
    let results = [first.unwrap(), second.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(CoreError::InvalidState { .. }))));
    assert_eq!(h.publishing.published_content_ids(), [ALBANIA_CONTENT_ID]);
    h.assert_invariants().await;
}

// ---------------------------------------------------------------------------
// Notes and history
// ---------------------------------------------------------------------------

#[tokio::test]
async fn notes_can_be_added_in_any_state() {
    let h = harness();
    let published = h.published_edition("albania").await;

    let note = h
        .lifecycle
        .add_note(published.id, &editor(), "Checked with the embassy")
        .await
        .unwrap();
    assert_eq!(note.request_type, ActionType::Note);
    assert_eq!(note.comment.as_deref(), Some("Checked with the embassy"));

    assert_matches!(
        h.lifecycle.add_note(published.id, &editor(), "   ").await,
        Err(CoreError::Validation(_))
    );
    assert_matches!(
        h.lifecycle.add_note(9999, &editor(), "Hello").await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn history_groups_actions_by_version() {
    let h = harness();
    let v1 = h.published_edition("albania").await;
    h.clock.advance(Duration::hours(1));
    let v2 = h.lifecycle.create_new_version(v1.id, &editor()).await.unwrap();
    h.lifecycle
        .add_note(v2.id, &editor(), "Waiting on sign off")
        .await
        .unwrap();

    let history = h.lifecycle.history("albania").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].version_number, 2);
    assert_eq!(history[1].version_number, 1);

    let v1_types: Vec<ActionType> = history[1].actions.iter().map(|a| a.request_type).collect();
    assert_eq!(v1_types, [ActionType::NewVersion, ActionType::Publish]);
    assert_eq!(history[1].actions[1].comment.as_deref(), Some("First published"));

    let v2_types: Vec<ActionType> = history[0].actions.iter().map(|a| a.request_type).collect();
    assert_eq!(v2_types, [ActionType::NewVersion, ActionType::Note]);
}

// ---------------------------------------------------------------------------
// Assets
// ---------------------------------------------------------------------------

fn upload(filename: &str, content_type: &str) -> AssetUpload {
    AssetUpload {
        filename: filename.to_string(),
        content_type: content_type.to_string(),
        bytes: b"file contents".to_vec(),
    }
}

#[tokio::test]
async fn assets_are_uploaded_replaced_and_removed() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();

    let image = AssetRef {
        id: "http://asset-manager.dev.gov.uk/assets/an_image_id".into(),
        file_url: "http://asset-manager.dev.gov.uk/media/an_image_id/image.jpg".into(),
        name: Some("image.jpg".into()),
    };
    h.assets.will_create(image.clone());

    let changes = EditionChanges {
        image: Some(AssetChange::Upload(upload("image.jpg", "image/jpeg"))),
        document: Some(AssetChange::Upload(upload("advice.pdf", "application/pdf"))),
        ..Default::default()
    };
    let saved = h.lifecycle.update_draft(draft.id, changes).await.unwrap();
    assert_eq!(saved.image, Some(image.clone()));
    assert!(saved.document.is_some());
    assert_eq!(h.assets.uploads().len(), 2);

    let assets = h.lifecycle.edition_assets(draft.id).await.unwrap();
    assert_eq!(assets.image, Some(image));

    let changes = EditionChanges {
        image: Some(AssetChange::Upload(upload("map.png", "image/png"))),
        document: Some(AssetChange::Remove),
        ..Default::default()
    };
    let saved = h.lifecycle.update_draft(draft.id, changes).await.unwrap();
    assert_eq!(saved.image.unwrap().name.as_deref(), Some("map.png"));
    assert_eq!(saved.document, None);
}

#[tokio::test]
async fn rejected_update_uploads_nothing() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();

    let changes = EditionChanges {
        title: Some(String::new()),
        image: Some(AssetChange::Upload(upload("image.jpg", "image/jpeg"))),
        ..Default::default()
    };
    assert_matches!(
        h.lifecycle.update_draft(draft.id, changes).await,
        Err(CoreError::Validation(_))
    );
    assert!(h.assets.uploads().is_empty());
}

#[tokio::test]
async fn store_reports_published_edition() {
    let h = harness();
    assert_eq!(h.store.find_published("albania").await.unwrap(), None);
    let published = h.published_edition("albania").await;
    assert_eq!(
        h.store.find_published("albania").await.unwrap().map(|e| e.id),
        Some(published.id)
    );
}

#[tokio::test]
async fn save_and_publish_checks_lock_version_without_other_changes() {
    let h = harness();
    let draft = h
        .lifecycle
        .create_initial_edition("albania", &editor())
        .await
        .unwrap();
    let saved = h
        .lifecycle
        .update_draft(
            draft.id,
            EditionChanges {
                change_description: Some("First published".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(saved.lock_version, draft.lock_version + 1);

    let stale = EditionChanges {
        lock_version: Some(draft.lock_version),
        ..Default::default()
    };
    assert_matches!(
        h.lifecycle.save_and_publish(draft.id, stale, &editor()).await,
        Err(CoreError::Conflict(_))
    );
    assert_eq!(
        h.lifecycle.edition(draft.id).await.unwrap().state,
        EditionState::Draft
    );
    assert!(h.publishing.calls().is_empty());

    let current = EditionChanges {
        lock_version: Some(saved.lock_version),
        ..Default::default()
    };
    let published = h
        .lifecycle
        .save_and_publish(draft.id, current, &editor())
        .await
        .unwrap();
    assert_eq!(published.state, EditionState::Published);
}
