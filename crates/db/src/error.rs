//! Mapping of sqlx errors onto [`CoreError`].

use travel_advice_core::error::CoreError;

/// PostgreSQL `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Convert a database error into the domain error the lifecycle expects.
///
/// Violations of the `uq_` constraints become [`CoreError::Conflict`]: they
/// are how a concurrent writer that lost the race finds out.
pub fn to_core_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(conflict_message(constraint));
            }
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::Internal(format!("Database error: {err}"))
}

fn conflict_message(constraint: &str) -> String {
    match constraint {
        "uq_editions_one_draft_per_country" => "Country already has a draft edition".into(),
        "uq_editions_one_published_per_country" => {
            "Country already has a published edition".into()
        }
        "uq_editions_country_version" => "Edition version number already taken".into(),
        other => format!("Duplicate value violates unique constraint: {other}"),
    }
}
