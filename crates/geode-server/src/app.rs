//! Router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::RELOAD_PATH;
use crate::live_reload;
use crate::middleware::security;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// The reload endpoint exists only when live reload is enabled; every
/// other path is a static file lookup.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let mut router = Router::new();

    if state.registry.is_some() {
        router = router.route(RELOAD_PATH, get(live_reload::sse_handler));
    }

    router
        .fallback(static_files::serve_file)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer())
                .layer(security::no_cache_layer()),
        )
        .with_state(state)
}
