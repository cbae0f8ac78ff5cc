use crate::cancel::{arm_deadline, DeadlineGuard};
use crate::enrichment::PeopleService;
use crate::errors::AppError;
use crate::filter::FilterSpec;
use crate::models::*;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderName, StatusCode},
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Largest accepted request body. Person payloads are tiny.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Person workflows (storage plus enrichment).
    pub people: PeopleService,
    /// Cancelled when the server shuts down; parent of every request token.
    pub shutdown: CancellationToken,
    /// Deadline for the core work of one request.
    pub request_timeout: Duration,
}

impl AppState {
    /// A token for one request, cancelled on shutdown or after the deadline.
    fn request_token(&self) -> (CancellationToken, DeadlineGuard) {
        let token = self.shutdown.child_token();
        let guard = arm_deadline(&token, self.request_timeout);
        (token, guard)
    }
}

/// Person routes plus the health check, without middleware.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/person", get(list_people).post(create_person))
        .route("/person/:id", put(update_person).delete(delete_person))
        .with_state(state)
}

/// Person routes wrapped in the HTTP middleware stack.
///
/// The body limit must stay outside the timeout: `TimeoutLayer` needs a
/// `Default` response body, which the limited body type does not provide.
pub fn app(state: Arc<AppState>, http_timeout: Duration) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    routes(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
            .layer(TimeoutLayer::new(http_timeout)),
    )
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "people-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /person
///
/// Validates the name parts, enriches and stores the person.
///
/// # Returns
///
/// * `{"status": "OK", "id": N}` on success, 409 when the (name, surname)
///   pair already exists, 400 on invalid input.
pub async fn create_person(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreatePersonRequest>, JsonRejection>,
) -> Result<Json<CreatePersonResponse>, AppError> {
    let req = decode_body(body)?;
    tracing::info!("POST /person - request: {:?}", req);

    req.validate().map_err(AppError::Validation)?;

    let (token, _deadline) = state.request_token();
    let id = state
        .people
        .create(&req.name, &req.surname, req.patronymic(), &token)
        .await?;

    Ok(Json(CreatePersonResponse {
        status: "OK".to_string(),
        id,
    }))
}

/// GET /person
///
/// Lists people matching the query parameters. Malformed `offset`/`limit`
/// are ignored instead of failing the request.
pub async fn list_people(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Person>>, AppError> {
    tracing::info!("GET /person - params: {:?}", params);

    let filter = FilterSpec::from_params(&params);
    let (token, _deadline) = state.request_token();
    let people = state.people.list(&filter, &token).await?;

    Ok(Json(people))
}

/// PUT /person/:id
///
/// Full replace: fields missing from the body are stored as their zero value.
pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<UpdatePersonRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = parse_person_id(&id)?;
    let req = decode_body(body)?;
    tracing::info!("PUT /person/{} - request: {:?}", id, req);

    let (token, _deadline) = state.request_token();
    state.people.update(id, &req, &token).await?;

    Ok(Json(StatusResponse::ok()))
}

/// DELETE /person/:id
pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = parse_person_id(&id)?;
    tracing::info!("DELETE /person/{}", id);

    let (token, _deadline) = state.request_token();
    state.people.delete(id, &token).await?;

    Ok(Json(StatusResponse::ok()))
}

fn decode_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(req)| req).map_err(|e| {
        AppError::Validation(format!("failed to decode request: {}", e.body_text()))
    })
}

fn parse_person_id(raw: &str) -> Result<i32, AppError> {
    raw.parse::<i32>()
        .map_err(|_| AppError::Validation(format!("invalid person id: {}", raw)))
}
