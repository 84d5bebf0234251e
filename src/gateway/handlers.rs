use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::Gateway;
use crate::{
    dto::{GENERATE_FIELDS_REQUIRED, GenerateMessageBody, HealthResponse, ListProfilesParams, SearchParams},
    service,
    upstream::{Payload, UpstreamOutcome},
};

pub fn build_router(state: Arc<Gateway>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/search", get(search_handler))
        .route("/api/profile/{id}", get(profile_handler))
        .route("/api/profiles", get(profiles_handler))
        .route("/api/generate-message", post(generate_message_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check(State(gateway): State<Arc<Gateway>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(gateway.upstream()))
}

pub async fn search_handler(
    State(gateway): State<Arc<Gateway>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> service::Result<Json<Payload>> {
    let Query(params) = params.map_err(|e| service::Error::Validation(e.body_text().into()))?;
    let request = params.validate()?;

    tracing::info!("searching for: {:?} ({} results)", request.query, request.num_results);
    tracing::info!("calling ML service at: {}", gateway.upstream());

    gateway
        .client
        .search(&request)
        .await
        .into_result(gateway.upstream())
        .map(Json)
        .inspect_err(|error| tracing::error!("search error: {error}"))
}

pub async fn profile_handler(
    State(gateway): State<Arc<Gateway>>,
    Path(id): Path<String>,
) -> service::Result<Json<Payload>> {
    let outcome = gateway.client.profile(&id).await;
    if !matches!(outcome, UpstreamOutcome::Success(_)) {
        tracing::error!("profile fetch error for {id:?}: {outcome}");
    }
    outcome.into_fetch_result("profile").map(Json)
}

pub async fn profiles_handler(
    State(gateway): State<Arc<Gateway>>,
    params: Result<Query<ListProfilesParams>, QueryRejection>,
) -> service::Result<Json<Payload>> {
    let Query(params) = params.map_err(|e| service::Error::Validation(e.body_text().into()))?;

    let outcome = gateway.client.profiles(&params).await;
    if !matches!(outcome, UpstreamOutcome::Success(_)) {
        tracing::error!("profiles fetch error: {outcome}");
    }
    outcome.into_fetch_result("profiles").map(Json)
}

pub async fn generate_message_handler(
    State(gateway): State<Arc<Gateway>>,
    body: Result<Json<GenerateMessageBody>, JsonRejection>,
) -> service::Result<Json<Payload>> {
    let Json(body) = body.map_err(|rejection| {
        tracing::warn!("rejected generate-message body: {}", rejection.body_text());
        service::Error::Validation(GENERATE_FIELDS_REQUIRED.into())
    })?;
    let request = body.validate()?;

    tracing::info!(
        "generating {} message for {}",
        request.tone,
        request.profile_name().unwrap_or("unnamed profile")
    );

    gateway
        .client
        .generate_message(&request)
        .await
        .into_result(gateway.upstream())
        .map(Json)
        .inspect_err(|error| tracing::error!("message generation error: {error}"))
}
