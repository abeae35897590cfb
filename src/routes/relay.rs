// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Relay routes: token exchange, registration and activity sync.
//!
//! Each call carries everything it needs (client credentials or access
//! token) in its body; nothing is kept between requests.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::ids;
use crate::models::relay::RelayRequest;
use crate::models::{
    ActivitiesRequest, ActivitiesResponse, RegisterRequest, RegisterResponse, TokenRequest,
    TokenResponse,
};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/token", post(token).fallback(method_fallback))
        .route("/register", post(register).fallback(method_fallback))
        .route("/activities", post(activities).fallback(method_fallback))
}

/// OPTIONS without CORS preflight headers still gets a 200; every other
/// method is rejected.
async fn method_fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    AppError::MethodNotAllowed.into_response()
}

/// Unwrap the JSON body and check required fields before any upstream call.
fn validated<T: RelayRequest>(
    payload: std::result::Result<Json<T>, JsonRejection>,
) -> Result<T> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected relay body");
        AppError::BadRequest(format!("Invalid request body: {}", e.body_text()))
    })?;

    if let Err(errors) = request.validate() {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        tracing::debug!(?fields, "Missing relay parameters");
        return Err(AppError::BadRequest(format!(
            "Missing required parameters: {}",
            T::REQUIRED
        )));
    }
    Ok(request)
}

/// Present after validation.
fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

/// Exchange an authorization code for an access token.
async fn token(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>> {
    let request = validated(payload)?;

    tracing::info!(client_id = %field(&request.client_id), "Exchanging authorization code");

    let token = state
        .polar
        .exchange_code(
            field(&request.client_id),
            field(&request.client_secret),
            field(&request.code),
            field(&request.redirect_uri),
            field(&request.code_verifier),
        )
        .await?;

    Ok(Json(token))
}

/// Register the token's owner with AccessLink (idempotent).
async fn register(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>> {
    let request = validated(payload)?;

    let member_id = match request.member_id.filter(|m| !m.trim().is_empty()) {
        Some(member_id) => member_id,
        None => ids::member_id()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Random generator failure")))?,
    };

    let registration = state
        .polar
        .register_user(field(&request.access_token), &member_id)
        .await?;

    Ok(Json(registration.into()))
}

/// Run one exercise-transaction sync and return the mapped activities.
async fn activities(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ActivitiesRequest>, JsonRejection>,
) -> Result<Json<ActivitiesResponse>> {
    let request = validated(payload)?;

    let outcome = state
        .exercise_sync
        .run(field(&request.access_token), field(&request.user_id))
        .await?;

    if !outcome.failures.is_empty() {
        tracing::warn!(
            failed = outcome.failures.len(),
            "Some exercises could not be fetched and were committed anyway"
        );
    }

    Ok(Json(ActivitiesResponse {
        activities: outcome.activities,
    }))
}
