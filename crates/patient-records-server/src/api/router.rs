//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Patient routes are nested under `/api/`; `/health` sits at the root.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use patient_records_core::PatientStore;

use crate::api::endpoints;
use crate::api::error::route_not_found;
use crate::api::types::ApiContext;

/// Build the full application router over `store`.
pub fn api_router(store: PatientStore) -> Router {
    build_router(ApiContext::new(store))
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    // Static segments such as `search` win over `:id`.
    let api = Router::new()
        .route(
            "/patients",
            get(endpoints::patients::list).post(endpoints::patients::create),
        )
        .route("/patients/search", get(endpoints::patients::search))
        .route("/patients/print", get(endpoints::reports::print))
        .route("/patients/export.csv", get(endpoints::reports::export_csv))
        .route(
            "/patients/:id",
            get(endpoints::patients::detail)
                .put(endpoints::patients::update)
                .delete(endpoints::patients::delete),
        )
        .route("/stats", get(endpoints::reports::statistics))
        .fallback(route_not_found)
        .with_state(ctx);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .nest("/api", api)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
}
