//! services/api/src/web/routes.rs
//!
//! Assembles the router: REST routes, middleware layers and the Swagger UI.

use crate::web::rest::{
    create_session_handler, delete_alert_handler, delete_sessions_handler,
    get_sessions_handler, raw_sessions_handler, ApiDoc, MessageResponse,
};
use crate::config::Config;
use crate::web::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router around `app_state`.
pub fn app(app_state: Arc<AppState>) -> Router {
    let config = app_state.config.clone();

    let api_router = Router::new()
        .route(
            "/session",
            get(get_sessions_handler)
                .post(create_session_handler)
                .delete(delete_sessions_handler),
        )
        .route("/session/raw", get(raw_sessions_handler))
        .route("/sessionalert/{alert_id}", delete(delete_alert_handler))
        .with_state(app_state);

    Router::new()
        .merge(with_middleware(api_router, &config))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Wraps the API routes in the body limit, request tracing, CORS and the
/// panic handler, innermost first.
fn with_middleware(router: Router, config: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    router
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::custom(internal_error))
}

/// Turns a panic inside a handler into a generic 500. The detail is only logged.
fn internal_error(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MessageResponse::failed("Internal server error")),
    )
        .into_response()
}
