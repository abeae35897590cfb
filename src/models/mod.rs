// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod credentials;
pub mod relay;
pub mod stats;
pub mod trail_run;

pub use activity::Activity;
pub use credentials::Credentials;
pub use relay::{
    ActivitiesRequest, ActivitiesResponse, RegisterRequest, RegisterResponse, TokenRequest,
    TokenResponse,
};
pub use stats::WeeklyStats;
pub use trail_run::{NewTrailRun, TrailRun};

use serde::{Deserialize, Deserializer};

/// Polar IDs arrive as JSON numbers or strings depending on the endpoint.
pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
