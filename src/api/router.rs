//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/v1`.
//!
//! Middleware stack (outermost → innermost):
//! 1. Identity resolver → 2. Audit logger

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost
/// layer). Endpoint handlers use `State<ApiContext>` (provided via
/// `with_state`).
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    // Layers are applied from bottom (innermost) to top (outermost):
    //   Extension (outermost) → Identity → Audit (innermost) → Handler
    //
    // Extension must be outermost so all middleware can access ApiContext.
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/doctors",
            get(endpoints::doctors::list).post(endpoints::doctors::create),
        )
        .route(
            "/doctors/:id",
            get(endpoints::doctors::detail)
                .patch(endpoints::doctors::update)
                .delete(endpoints::doctors::remove),
        )
        .route(
            "/doctors/:id/availability",
            get(endpoints::doctors::availability_list)
                .post(endpoints::doctors::availability_create),
        )
        .route(
            "/specialties",
            get(endpoints::specialties::list).post(endpoints::specialties::create),
        )
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/appointments/:id",
            get(endpoints::appointments::detail)
                .patch(endpoints::appointments::update)
                .delete(endpoints::appointments::remove),
        )
        .route(
            "/appointments/:id/status",
            post(endpoints::appointments::set_status),
        )
        .route(
            "/time-slots",
            get(endpoints::time_slots::list).post(endpoints::time_slots::create),
        )
        .route(
            "/time-slots/:id",
            get(endpoints::time_slots::detail)
                .patch(endpoints::time_slots::update)
                .delete(endpoints::time_slots::remove),
        )
        .route(
            "/patient-profiles",
            get(endpoints::patient_profiles::list).post(endpoints::patient_profiles::create),
        )
        .route(
            "/patient-profiles/:id",
            get(endpoints::patient_profiles::detail).patch(endpoints::patient_profiles::update),
        )
        .with_state(ctx.clone())
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::identity::resolve_caller))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx));

    Router::new().nest("/api/v1", routes).layer(CorsLayer::permissive())
}
