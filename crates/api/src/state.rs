use travel_advice_core::EditionLifecycle;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the lifecycle holds its collaborators behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Every read and write goes through the lifecycle service.
    pub lifecycle: EditionLifecycle,
}
