//! Maintenance tasks run outside the request path: sending the index
//! document and republishing published editions.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use travel_advice_core::EditionLifecycle;

/// Content id of the `/foreign-travel-advice` index document.
pub const DEFAULT_INDEX_CONTENT_ID: &str = "08d48cdd-6b50-43ff-a53b-beab47f4aab0";

/// Travel advice publisher maintenance tasks.
#[derive(Parser, Debug)]
#[command(name = "travel-advice-worker", about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Send the index document to the publishing API.
    PublishIndex,

    /// Resend one country's published edition with update type `republish`.
    RepublishEdition {
        /// Country slug, e.g. `albania`.
        slug: String,
    },

    /// Resend every country's published edition.
    RepublishEditions,
}

/// Read `INDEX_CONTENT_ID`, falling back to the production id.
pub fn index_content_id() -> String {
    std::env::var("INDEX_CONTENT_ID").unwrap_or_else(|_| DEFAULT_INDEX_CONTENT_ID.to_string())
}

/// Run one task to completion.
///
/// `republish-editions` keeps going past failing countries but still
/// returns an error at the end if any failed.
pub async fn run(
    lifecycle: &EditionLifecycle,
    command: &Command,
    index_content_id: &str,
) -> anyhow::Result<()> {
    match command {
        Command::PublishIndex => {
            lifecycle
                .publish_index(index_content_id)
                .await
                .context("Failed to publish index")?;
        }
        Command::RepublishEdition { slug } => {
            let republished = lifecycle
                .republish_edition(slug)
                .await
                .with_context(|| format!("Failed to republish '{slug}'"))?;
            if !republished {
                tracing::warn!(country = %slug, "Nothing to republish");
            }
        }
        Command::RepublishEditions => {
            let report = lifecycle.republish_editions().await?;
            if !report.is_success() {
                let failed: Vec<&str> = report.failed.iter().map(|(s, _)| s.as_str()).collect();
                bail!("Republish failed for: {}", failed.join(", "));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use travel_advice_core::action::Actor;
    use travel_advice_core::changes::EditionChanges;
    use travel_advice_core::country::Country;
    use travel_advice_core::memory::MemoryEditionStore;
    use travel_advice_core::testing::{FakeAssetManager, RecordingPublishingApi};

    use super::*;

    const ALBANIA_CONTENT_ID: &str = "2a3938e1-d588-45fc-8c8f-0f51814d5409";

    fn lifecycle() -> (EditionLifecycle, Arc<RecordingPublishingApi>) {
        let store = MemoryEditionStore::new([
            Country::new("albania", ALBANIA_CONTENT_ID, "Albania"),
            Country::new("aruba", "56bae85b-a57c-4ca2-9dbd-68361a086bb3", "Aruba"),
        ]);
        let publishing = Arc::new(RecordingPublishingApi::new());
        let lifecycle = EditionLifecycle::new(
            Arc::new(store),
            publishing.clone(),
            Arc::new(FakeAssetManager::new()),
        );
        (lifecycle, publishing)
    }

    async fn publish_albania(lifecycle: &EditionLifecycle) {
        let draft = lifecycle
            .create_initial_edition("albania", &Actor::System)
            .await
            .unwrap();
        let changes = EditionChanges {
            change_description: Some("First published".into()),
            ..Default::default()
        };
        lifecycle.update_draft(draft.id, changes).await.unwrap();
        lifecycle.publish(draft.id, &Actor::System).await.unwrap();
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["travel-advice-worker", "publish-index"]).unwrap();
        assert_eq!(cli.command, Command::PublishIndex);

        let cli =
            Cli::try_parse_from(["travel-advice-worker", "republish-edition", "albania"]).unwrap();
        assert_eq!(
            cli.command,
            Command::RepublishEdition {
                slug: "albania".into()
            }
        );

        assert!(Cli::try_parse_from(["travel-advice-worker", "republish-edition"]).is_err());
        assert!(Cli::try_parse_from(["travel-advice-worker"]).is_err());
    }

    #[tokio::test]
    async fn publish_index_uses_given_content_id() {
        let (lifecycle, publishing) = lifecycle();

        run(&lifecycle, &Command::PublishIndex, DEFAULT_INDEX_CONTENT_ID)
            .await
            .unwrap();

        assert_eq!(publishing.published_content_ids(), [DEFAULT_INDEX_CONTENT_ID]);
    }

    #[tokio::test]
    async fn republish_edition_without_published_edition_succeeds() {
        let (lifecycle, publishing) = lifecycle();
        let command = Command::RepublishEdition {
            slug: "aruba".into(),
        };

        run(&lifecycle, &command, DEFAULT_INDEX_CONTENT_ID)
            .await
            .unwrap();

        assert!(publishing.calls().is_empty());
    }

    #[tokio::test]
    async fn republish_edition_for_unknown_country_fails() {
        let (lifecycle, _) = lifecycle();
        let command = Command::RepublishEdition {
            slug: "narnia".into(),
        };

        let err = run(&lifecycle, &command, DEFAULT_INDEX_CONTENT_ID)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("narnia"));
    }

    #[tokio::test]
    async fn republish_editions_fails_when_any_country_fails() {
        let (lifecycle, publishing) = lifecycle();
        publish_albania(&lifecycle).await;
        publishing.fail_with("publishing-api unavailable");

        let err = run(&lifecycle, &Command::RepublishEditions, DEFAULT_INDEX_CONTENT_ID)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Republish failed for: albania");
    }

    #[tokio::test]
    async fn republish_editions_resends_published() {
        let (lifecycle, publishing) = lifecycle();
        publish_albania(&lifecycle).await;

        run(&lifecycle, &Command::RepublishEditions, DEFAULT_INDEX_CONTENT_ID)
            .await
            .unwrap();

        assert_eq!(
            publishing.published_content_ids(),
            [ALBANIA_CONTENT_ID, ALBANIA_CONTENT_ID]
        );
    }
}
