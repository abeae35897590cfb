// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Locally tracked trail run and its weekly score.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time_utils::week_key;

/// Trail run stored in the run store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailRun {
    /// Unique within the store
    pub id: String,
    /// Day of the run (`YYYY-MM-DD`); also the re-import dedup key
    pub date: NaiveDate,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
}

/// Run data before an ID is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrailRun {
    pub date: NaiveDate,
    pub distance_km: f64,
    pub elevation_gain_m: f64,
}

impl TrailRun {
    pub fn from_new(id: String, run: NewTrailRun) -> Self {
        Self {
            id,
            date: run.date,
            distance_km: run.distance_km,
            elevation_gain_m: run.elevation_gain_m,
        }
    }

    /// 1 km = 1 pt, 100 m D+ = 1 pt.
    pub fn points(&self) -> f64 {
        self.distance_km + self.elevation_gain_m / 100.0
    }

    pub fn week_key(&self) -> String {
        week_key(self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points() {
        let run = TrailRun {
            id: "r1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            distance_km: 10.0,
            elevation_gain_m: 200.0,
        };
        assert_eq!(run.points(), 12.0);
        assert_eq!(run.week_key(), "2024-W01");
    }

    #[test]
    fn test_date_serializes_as_plain_day() {
        let run = TrailRun {
            id: "r1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            distance_km: 5.5,
            elevation_gain_m: 0.0,
        };
        let json = serde_json::to_value(&run).unwrap();
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["distanceKm"], 5.5);
        assert_eq!(json["elevationGainM"], 0.0);
    }
}
