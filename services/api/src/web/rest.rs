//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use utoipa::{OpenApi, ToSchema};
use vdr_core::{query, FieldError};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_session_handler,
        get_sessions_handler,
        raw_sessions_handler,
        delete_sessions_handler,
        delete_alert_handler,
    ),
    components(
        schemas(CreateSessionResponse, ValidationFailureResponse, FieldErrorBody, MessageResponse)
    ),
    tags(
        (name = "VDR Session API", description = "Stores and serves voyage data recorder sessions.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The response payload sent after a session has been stored.
#[derive(Serialize, ToSchema)]
pub struct CreateSessionResponse {
    success: bool,
    message: String,
    id: i64,
}

/// One schema violation in a rejected submission.
#[derive(Serialize, ToSchema)]
pub struct FieldErrorBody {
    /// JSON pointer to the offending value.
    path: String,
    message: String,
}

impl From<FieldError> for FieldErrorBody {
    fn from(e: FieldError) -> Self {
        Self {
            path: e.path,
            message: e.message,
        }
    }
}

/// The response payload for a submission that was not accepted.
#[derive(Serialize, ToSchema)]
pub struct ValidationFailureResponse {
    success: bool,
    errors: Vec<FieldErrorBody>,
}

/// A plain success or failure message.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    success: bool,
    message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Deserialize)]
pub struct SessionQuery {
    id: Option<String>,
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(MessageResponse::failed(message))).into_response()
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Store a new session.
///
/// The body must satisfy the session schema. Any `session_data.id` it carries
/// is replaced by the id the store assigns.
#[utoipa::path(
    post,
    path = "/session",
    request_body(content_type = "application/json", description = "A complete session document."),
    responses(
        (status = 201, description = "Session stored", body = CreateSessionResponse),
        (status = 400, description = "The body is not JSON or violates the schema", body = ValidationFailureResponse),
        (status = 500, description = "Internal server error", body = MessageResponse)
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), (StatusCode, Json<ValidationFailureResponse>)>
{
    let Json(document) = payload.map_err(|rejection| {
        warn!("Rejected session body: {}", rejection.body_text());
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        let errors = vec![FieldErrorBody {
            path: String::new(),
            message: rejection.body_text(),
        }];
        (
            status,
            Json(ValidationFailureResponse {
                success: false,
                errors,
            }),
        )
    })?;

    let mut store = app_state.store.lock().await;
    match store.submit(document).await {
        Ok(id) => Ok((
            StatusCode::CREATED,
            Json(CreateSessionResponse {
                success: true,
                message: "Session saved".to_string(),
                id,
            }),
        )),
        Err(e) => {
            warn!("Session rejected: {}", e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ValidationFailureResponse {
                    success: false,
                    errors: e.errors.into_iter().map(FieldErrorBody::from).collect(),
                }),
            ))
        }
    }
}

/// List all sessions, or fetch one.
///
/// Without `id`, returns the `session_data` of every session as a single
/// page. With `id`, returns the complete stored session.
#[utoipa::path(
    get,
    path = "/session",
    params(
        ("id" = Option<i64>, Query, description = "Id of the session to return in full.")
    ),
    responses(
        (status = 200, description = "The session listing, or the requested session"),
        (status = 404, description = "No session has this id", body = MessageResponse)
    )
)]
pub async fn get_sessions_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SessionQuery>,
) -> Response {
    let store = app_state.store.lock().await;
    match params.id.as_deref().filter(|id| !id.is_empty()) {
        Some(raw_id) => match query::detail(&store, raw_id) {
            Some(session) => Json(session).into_response(),
            None => {
                debug!(id = raw_id, "Session not found");
                not_found("Session not found")
            }
        },
        None => Json(query::summary_page(&store)).into_response(),
    }
}

/// Dump every stored session in full.
#[utoipa::path(
    get,
    path = "/session/raw",
    responses(
        (status = 200, description = "Every stored session")
    )
)]
pub async fn raw_sessions_handler(State(app_state): State<Arc<AppState>>) -> Response {
    let store = app_state.store.lock().await;
    Json(query::raw_dump(&store)).into_response()
}

/// Delete every stored session and the snapshot file.
#[utoipa::path(
    delete,
    path = "/session",
    responses(
        (status = 200, description = "All sessions deleted", body = MessageResponse)
    )
)]
pub async fn delete_sessions_handler(State(app_state): State<Arc<AppState>>) -> Json<MessageResponse> {
    app_state.store.lock().await.reset_all().await;
    Json(MessageResponse::ok("Deleted all stored sessions"))
}

/// Delete an alarm.
///
/// Alarm ids are unique across the store, so every session is searched.
#[utoipa::path(
    delete,
    path = "/sessionalert/{alert_id}",
    params(
        ("alert_id" = i64, Path, description = "Id of the alarm entry to delete.")
    ),
    responses(
        (status = 200, description = "Alarm deleted", body = MessageResponse),
        (status = 404, description = "No alarm has this id", body = MessageResponse)
    )
)]
pub async fn delete_alert_handler(
    State(app_state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Response {
    let Ok(alert_id) = alert_id.trim().parse::<i64>() else {
        debug!(alert_id, "Non-numeric alert id");
        return not_found("Alert not found");
    };

    let deleted = app_state.store.lock().await.delete_alarm(alert_id).await;
    if deleted {
        Json(MessageResponse::ok(format!("Deleted alert {}", alert_id))).into_response()
    } else {
        not_found("Alert not found")
    }
}
