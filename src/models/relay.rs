// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Request and response bodies of the relay endpoints.
//!
//! Shared by the axum handlers and by [`crate::services::RelayClient`].
//! Request fields are optional at the serde level so that a missing field is
//! reported as a 400 validation error rather than a JSON rejection.

use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use super::{deserialize_opt_id, Activity};

/// Request body with a fixed list of required parameters.
pub trait RelayRequest: Validate {
    /// Human-readable list for the 400 response.
    const REQUIRED: &'static str;
}

/// `POST /token` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenRequest {
    #[validate(required, length(min = 1))]
    pub code: Option<String>,
    #[validate(required, length(min = 1))]
    pub client_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub client_secret: Option<String>,
    #[validate(required, length(min = 1))]
    pub redirect_uri: Option<String>,
    #[validate(required, length(min = 1))]
    pub code_verifier: Option<String>,
}

impl RelayRequest for TokenRequest {
    const REQUIRED: &'static str = "code, clientId, clientSecret, redirectUri, codeVerifier";
}

/// `POST /token` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: String,
}

/// `POST /register` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    #[validate(required, length(min = 1))]
    pub access_token: Option<String>,
    /// Generated by the relay when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

impl RelayRequest for RegisterRequest {
    const REQUIRED: &'static str = "accessToken";
}

/// `POST /register` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
    pub already_registered: bool,
}

/// `POST /activities` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivitiesRequest {
    #[validate(required, length(min = 1))]
    pub access_token: Option<String>,
    /// Older front ends send the numeric Polar user ID as a number.
    #[serde(deserialize_with = "deserialize_opt_id")]
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
}

impl RelayRequest for ActivitiesRequest {
    const REQUIRED: &'static str = "accessToken, userId";
}

/// `POST /activities` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub activities: Vec<Activity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_validation() {
        let req: TokenRequest = serde_json::from_str(
            r#"{"code":"c","clientId":"id","clientSecret":"s","redirectUri":"http://x"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code_verifier"));
    }

    #[test]
    fn test_empty_string_is_missing() {
        let req: RegisterRequest = serde_json::from_str(r#"{"accessToken":""}"#).unwrap();
        assert!(req.validate().is_err());

        let req: RegisterRequest = serde_json::from_str(r#"{"accessToken":"t"}"#).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_activities_request_accepts_numeric_user_id() {
        let req: ActivitiesRequest =
            serde_json::from_str(r#"{"accessToken":"t","userId":12345}"#).unwrap();
        assert_eq!(req.user_id.as_deref(), Some("12345"));
        assert!(req.validate().is_ok());

        let req: ActivitiesRequest = serde_json::from_str(r#"{"accessToken":"t"}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
