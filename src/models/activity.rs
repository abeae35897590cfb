// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Polar exercise mapped into the relay's activity shape.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Sport codes counted as trail runs (substring match, case-insensitive).
pub const TRAIL_RUN_SPORTS: [&str; 5] = [
    "RUNNING",
    "TRAIL_RUNNING",
    "MOUNTAIN_RUNNING",
    "FELL_RUNNING",
    "ORIENTEERING",
];

/// Activity returned by `POST /activities`. Transient: never stored as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Polar exercise ID, or a generated one if Polar sent none
    pub id: String,
    /// Start time (ISO 8601)
    pub date: String,
    /// Free-text Polar sport code (RUNNING, CYCLING, ...)
    pub sport: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascent_meters: Option<f64>,
    /// ISO 8601 duration (e.g. `PT1H2M3S`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Activity {
    /// Whether the sport code names any running discipline.
    pub fn is_trail_run(&self) -> bool {
        let sport = self.sport.to_uppercase();
        TRAIL_RUN_SPORTS.iter().any(|s| sport.contains(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(sport: &str) -> Activity {
        Activity {
            id: "e1".to_string(),
            date: "2024-05-01T08:00:00Z".to_string(),
            sport: sport.to_string(),
            distance_meters: None,
            ascent_meters: None,
            duration: None,
        }
    }

    #[test]
    fn test_is_trail_run() {
        for sport in [
            "RUNNING",
            "trail_running",
            "Mountain_Running",
            "FELL_RUNNING",
            "ORIENTEERING",
            "TREADMILL_RUNNING",
        ] {
            assert!(activity(sport).is_trail_run(), "{sport} should count");
        }
        for sport in ["CYCLING", "WALKING", "SWIMMING", "RUN", ""] {
            assert!(!activity(sport).is_trail_run(), "{sport} should not count");
        }
    }

    #[test]
    fn test_serializes_camel_case_and_omits_missing() {
        let mut a = activity("RUNNING");
        a.distance_meters = Some(10000.0);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["distanceMeters"], 10000.0);
        assert!(json.get("ascentMeters").is_none());
        assert!(json.get("duration").is_none());
    }
}
