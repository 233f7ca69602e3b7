//! Router construction.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Upper bound on handling a single request.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// URL paths answered by something other than a page.
pub(crate) const RESERVED_PATHS: &[&str] = &["/css"];

/// Create the application router.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/css", get(handlers::css::get_stylesheet))
        .route("/", get(handlers::pages::get_root_page))
        .route("/{*path}", get(handlers::pages::get_page));

    with_layers(router, REQUEST_TIMEOUT).with_state(state)
}

/// Wrap `router` in tracing, security headers and a request timeout.
///
/// The timeout is innermost so timed-out responses still carry the headers.
fn with_layers<S>(router: Router<S>, request_timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(security::csp_layer())
            .layer(security::content_type_options_layer())
            .layer(security::frame_options_layer())
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
