// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Polar client credentials and the tokens obtained for them.

use serde::{Deserialize, Serialize};

/// Credentials record kept in the credential store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    /// Set after a successful OAuth exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Polar user ID, set after registration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Credentials {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            access_token: None,
            user_id: None,
        }
    }

    /// Stray whitespace in an ID or secret corrupts the Basic auth header.
    pub fn trimmed(self) -> Self {
        let trim_opt = |v: Option<String>| {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        };
        Self {
            client_id: self.client_id.trim().to_string(),
            client_secret: self.client_secret.trim().to_string(),
            access_token: trim_opt(self.access_token),
            user_id: trim_opt(self.user_id),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Access token and user ID, once both OAuth and registration succeeded.
    pub fn linked_account(&self) -> Option<(&str, &str)> {
        match (&self.access_token, &self.user_id) {
            (Some(token), Some(user)) => Some((token.as_str(), user.as_str())),
            _ => None,
        }
    }
}
