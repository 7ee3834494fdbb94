//! Room collection routes, with the permissive CORS contract the browser
//! builder requires.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::rooms::{create, list, preflight, remove, update};
use crate::routes::common_routes;
use crate::state::AppState;

/// Stage images travel inline as data URIs, so the body cap sits well above
/// axum's default.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// CRUD routes over the room collection. The path is the source contract's.
pub fn room_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/users",
            get(list)
                .post(create)
                .patch(update)
                .delete(remove)
                .options(preflight),
        )
        .with_state(state)
}

/// Any origin, the four CRUD methods plus OPTIONS, and the standard
/// content/authorization headers — applied to every response.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// The full application router: room CRUD plus operational routes, body
/// limit and CORS applied.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(room_routes(state))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors_layer())
}
