//! Batch republishing tasks run by the worker.

use serde::Serialize;

use crate::error::CoreError;
use crate::lifecycle::EditionLifecycle;
use crate::payload::{compute_index_payload, compute_publish_payload, UpdateType};

/// Outcome of [`EditionLifecycle::republish_editions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepublishReport {
    pub republished: Vec<String>,
    /// Countries with no published edition.
    pub skipped: Vec<String>,
    /// Country slug and error message.
    pub failed: Vec<(String, String)>,
}

impl RepublishReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl EditionLifecycle {
    /// Send the `/foreign-travel-advice` index document.
    pub async fn publish_index(&self, index_content_id: &str) -> Result<(), CoreError> {
        let payload = compute_index_payload(self.clock().now());
        self.send_to_publishing_api(index_content_id, &payload, payload.update_type)
            .await?;
        tracing::info!(content_id = index_content_id, "Index published");
        Ok(())
    }

    /// Re-send one country's published edition with update type
    /// `republish`. Returns `false` when the country has nothing published.
    pub async fn republish_edition(&self, country_slug: &str) -> Result<bool, CoreError> {
        let country = self.country(country_slug).await?;
        let Some(edition) = self.store().find_published(&country.slug).await? else {
            tracing::warn!(country = %country.slug, "No published edition, skipping republish");
            return Ok(false);
        };

        let payload = compute_publish_payload(&edition, &country, UpdateType::Republish);
        self.send_to_publishing_api(&country.content_id, &payload, UpdateType::Republish)
            .await?;
        tracing::info!(
            country = %country.slug,
            edition_id = edition.id,
            "Edition republished"
        );
        Ok(true)
    }

    /// Republish every country's published edition.
    ///
    /// A failure for one country is recorded and the rest still run.
    pub async fn republish_editions(&self) -> Result<RepublishReport, CoreError> {
        let mut report = RepublishReport::default();

        for country in self.countries().await? {
            match self.republish_edition(&country.slug).await {
                Ok(true) => report.republished.push(country.slug),
                Ok(false) => report.skipped.push(country.slug),
                Err(e) => {
                    tracing::error!(country = %country.slug, error = %e, "Republish failed");
                    report.failed.push((country.slug, e.to_string()));
                }
            }
        }

        tracing::info!(
            republished = report.republished.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Republish run finished"
        );
        Ok(report)
    }
}
