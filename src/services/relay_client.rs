// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the relay's POST endpoints, used by the front end.
//!
//! The client secret only ever travels to the relay, never to Polar
//! directly from here.

use crate::error::ClientError;
use crate::models::{
    ActivitiesRequest, ActivitiesResponse, Activity, RegisterRequest, RegisterResponse,
    TokenRequest, TokenResponse,
};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Relay API client.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /token`
    pub async fn exchange_token(&self, request: &TokenRequest) -> Result<TokenResponse, ClientError> {
        self.post("/token", request).await
    }

    /// `POST /register`
    pub async fn register(
        &self,
        access_token: &str,
        member_id: Option<String>,
    ) -> Result<RegisterResponse, ClientError> {
        let request = RegisterRequest {
            access_token: Some(access_token.to_string()),
            member_id,
        };
        self.post("/register", &request).await
    }

    /// `POST /activities`
    pub async fn fetch_activities(
        &self,
        access_token: &str,
        user_id: &str,
    ) -> Result<Vec<Activity>, ClientError> {
        let request = ActivitiesRequest {
            access_token: Some(access_token.to_string()),
            user_id: Some(user_id.to_string()),
        };
        let response: ActivitiesResponse = self.post("/activities", &request).await?;
        Ok(response.activities)
    }

    async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, path, "Relay request failed");
            return Err(ClientError::Relay { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("{}: {}", path, e)))
    }
}
