//! Editor identity extractor.
//!
//! Authentication happens upstream of this service; the proxy forwards the
//! signed-in editor's display name in `X-Editor-Name`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use travel_advice_core::action::Actor;
use travel_advice_core::error::CoreError;

use crate::error::AppError;

pub const EDITOR_HEADER: &str = "x-editor-name";

/// The editor performing the request. Required on every write.
///
/// ```ignore
/// async fn my_handler(editor: Editor) -> AppResult<Json<()>> {
///     tracing::info!(editor = %editor.name, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Editor {
    pub name: String,
}

impl Editor {
    pub fn actor(&self) -> Actor {
        Actor::editor(self.name.clone())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Editor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(EDITOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing X-Editor-Name header".into(),
                ))
            })?;

        Ok(Editor {
            name: name.to_string(),
        })
    }
}
