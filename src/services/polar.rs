// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polar AccessLink API client.
//!
//! Handles:
//! - OAuth2 code-for-token exchange (form POST with HTTP Basic auth)
//! - User registration, where 409 Conflict means "already linked"
//! - The exercise-transaction calls (open, list, fetch, commit)

use crate::config::Config;
use crate::error::AppError;
use crate::models::{deserialize_opt_id, RegisterResponse, TokenResponse};
use reqwest::StatusCode;
use serde::Deserialize;

/// Polar AccessLink API client.
#[derive(Clone)]
pub struct PolarClient {
    http: reqwest::Client,
    token_url: String,
    base_url: String,
}

impl PolarClient {
    /// Create a client for the endpoints named in `config`.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            token_url: config.polar_token_url.clone(),
            base_url: config.polar_api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await
            .map_err(network_error)?;

        let response = check_response(response, "Token exchange").await?;
        let token: PolarTokenResponse = parse_json(response, "Token exchange").await?;

        tracing::info!(
            expires_in = token.expires_in.unwrap_or_default(),
            "Polar token exchange succeeded"
        );

        Ok(TokenResponse {
            access_token: token.access_token,
            expires_in: token.expires_in.unwrap_or_default(),
            token_type: token.token_type.unwrap_or_default(),
        })
    }

    /// Register the token's owner with AccessLink.
    ///
    /// Registering an already linked account answers 409 Conflict with the
    /// existing user; that is reported as [`Registration::AlreadyLinked`].
    pub async fn register_user(
        &self,
        access_token: &str,
        member_id: &str,
    ) -> Result<Registration, AppError> {
        let url = format!("{}/users", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "member-id": member_id }))
            .send()
            .await
            .map_err(network_error)?;

        if response.status() == StatusCode::CONFLICT {
            let user: PolarUser = parse_json(response, "User registration").await?;
            let user_id = user.require_id()?;
            tracing::info!(user_id = %user_id, "Polar user already registered");
            return Ok(Registration::AlreadyLinked(user_id));
        }

        let response = check_response(response, "User registration").await?;
        let user: PolarUser = parse_json(response, "User registration").await?;
        let user_id = user.require_id()?;
        tracing::info!(user_id = %user_id, "Polar user registered");
        Ok(Registration::Created(user_id))
    }

    /// Open an exercise transaction.
    ///
    /// Returns `None` when Polar has no new exercises (204 No Content, an
    /// empty body, or a body without `transaction-id`).
    pub async fn create_transaction(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Option<String>, AppError> {
        let url = self.transactions_url(user_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(network_error)?;

        let response = check_response(response, "Transaction creation").await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.text().await.map_err(network_error)?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        let transaction: PolarTransaction = serde_json::from_str(&body).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Transaction creation: JSON parse error: {}", e))
        })?;
        Ok(transaction.transaction_id)
    }

    /// List the exercise URLs belonging to an open transaction.
    pub async fn list_exercises(
        &self,
        access_token: &str,
        user_id: &str,
        transaction_id: &str,
    ) -> Result<Vec<String>, AppError> {
        let url = format!("{}/{}", self.transactions_url(user_id), transaction_id);
        let response = self.get_with_retry(&url, access_token).await?;
        let response = check_response(response, "Exercise list fetch").await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        let list: PolarExerciseList = parse_json(response, "Exercise list fetch").await?;
        Ok(list.exercises)
    }

    /// Fetch one exercise. `url` comes verbatim from the transaction list.
    pub async fn get_exercise(
        &self,
        access_token: &str,
        url: &str,
    ) -> Result<PolarExercise, AppError> {
        let response = self.get_with_retry(url, access_token).await?;
        let response = check_response(response, "Exercise fetch").await?;
        parse_json(response, "Exercise fetch").await
    }

    /// Commit the transaction so its exercises are not listed again.
    pub async fn commit_transaction(
        &self,
        access_token: &str,
        user_id: &str,
        transaction_id: &str,
    ) -> Result<(), AppError> {
        let url = format!("{}/{}", self.transactions_url(user_id), transaction_id);
        let response = self
            .http
            .put(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(network_error)?;

        check_response(response, "Transaction commit").await?;
        tracing::info!(transaction_id, "Exercise transaction committed");
        Ok(())
    }

    fn transactions_url(&self, user_id: &str) -> String {
        format!(
            "{}/users/{}/exercise-transactions",
            self.base_url,
            urlencoding::encode(user_id)
        )
    }

    /// GET with bearer auth; a timed-out attempt is retried once.
    async fn get_with_retry(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<reqwest::Response, AppError> {
        let send = || {
            self.http
                .get(url)
                .bearer_auth(access_token)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
        };

        match send().await {
            Ok(response) => Ok(response),
            Err(e) if e.is_timeout() => {
                tracing::warn!(url, "Polar request timed out, retrying once");
                send().await.map_err(network_error)
            }
            Err(e) => Err(network_error(e)),
        }
    }
}

/// Outcome of user registration. Both variants are successes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(String),
    AlreadyLinked(String),
}

impl Registration {
    pub fn user_id(&self) -> &str {
        match self {
            Registration::Created(id) | Registration::AlreadyLinked(id) => id,
        }
    }

    pub fn already_registered(&self) -> bool {
        matches!(self, Registration::AlreadyLinked(_))
    }
}

impl From<Registration> for RegisterResponse {
    fn from(registration: Registration) -> Self {
        let already_registered = registration.already_registered();
        let user_id = match registration {
            Registration::Created(id) | Registration::AlreadyLinked(id) => id,
        };
        Self {
            user_id,
            already_registered,
        }
    }
}

fn network_error(e: reqwest::Error) -> AppError {
    AppError::Network(e.to_string())
}

/// Pass 2xx responses through; anything else becomes an upstream error
/// carrying the status and body.
async fn check_response(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(status, body = %body, operation, "Polar request failed");

    Err(AppError::Upstream {
        operation,
        status,
        body,
    })
}

async fn parse_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<T, AppError> {
    response
        .json()
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("{}: JSON parse error: {}", operation, e)))
}

/// Token response from the Polar OAuth2 endpoint.
#[derive(Debug, Clone, Deserialize)]
struct PolarTokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Registration (or conflict) body.
#[derive(Debug, Clone, Deserialize)]
struct PolarUser {
    #[serde(rename = "polar-user-id", default, deserialize_with = "deserialize_opt_id")]
    polar_user_id: Option<String>,
}

impl PolarUser {
    fn require_id(self) -> Result<String, AppError> {
        self.polar_user_id.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "User registration: response has no polar-user-id"
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PolarTransaction {
    #[serde(rename = "transaction-id", default, deserialize_with = "deserialize_opt_id")]
    transaction_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PolarExerciseList {
    #[serde(default)]
    exercises: Vec<String>,
}

/// Exercise summary as returned by AccessLink.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolarExercise {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    #[serde(rename = "start-time", default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub sport: Option<String>,
    /// Meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Meters climbed
    #[serde(default)]
    pub ascent: Option<f64>,
    /// ISO 8601 duration
    #[serde(default)]
    pub duration: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_accepts_numeric_id() {
        let exercise: PolarExercise = serde_json::from_str(
            r#"{"id": 1937529874, "start-time": "2024-05-01T08:00:00", "sport": "RUNNING",
                "distance": 10000, "ascent": 300.5, "duration": "PT1H"}"#,
        )
        .unwrap();
        assert_eq!(exercise.id.as_deref(), Some("1937529874"));
        assert_eq!(exercise.distance, Some(10000.0));
        assert_eq!(exercise.ascent, Some(300.5));
    }

    #[test]
    fn test_exercise_tolerates_missing_fields() {
        let exercise: PolarExercise = serde_json::from_str("{}").unwrap();
        assert!(exercise.id.is_none());
        assert!(exercise.start_time.is_none());
        assert!(exercise.sport.is_none());
    }

    #[test]
    fn test_registration_into_response() {
        let resp: RegisterResponse = Registration::AlreadyLinked("42".to_string()).into();
        assert_eq!(resp.user_id, "42");
        assert!(resp.already_registered);

        let resp: RegisterResponse = Registration::Created("7".to_string()).into();
        assert!(!resp.already_registered);
    }
}
