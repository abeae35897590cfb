// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weekly score aggregates over the run store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::TrailRun;

/// Points and run count for one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    /// ISO week key (`YYYY-Www`)
    pub week: String,
    /// Rounded to one decimal
    pub total_points: f64,
    pub run_count: u32,
}

impl WeeklyStats {
    /// Aggregate runs per ISO week, most recent week first.
    pub fn from_runs(runs: &[TrailRun]) -> Vec<WeeklyStats> {
        let mut by_week: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for run in runs {
            let entry = by_week.entry(run.week_key()).or_insert((0.0, 0));
            entry.0 += run.points();
            entry.1 += 1;
        }

        by_week
            .into_iter()
            .rev()
            .map(|(week, (points, count))| WeeklyStats {
                week,
                total_points: (points * 10.0).round() / 10.0,
                run_count: count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn run(id: &str, date: (i32, u32, u32), km: f64, gain: f64) -> TrailRun {
        TrailRun {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            distance_km: km,
            elevation_gain_m: gain,
        }
    }

    #[test]
    fn test_same_week_aggregates() {
        let runs = vec![
            run("a", (2024, 1, 1), 10.0, 200.0),
            run("b", (2024, 1, 3), 5.0, 0.0),
        ];
        let stats = WeeklyStats::from_runs(&runs);
        assert_eq!(
            stats,
            vec![WeeklyStats {
                week: "2024-W01".to_string(),
                total_points: 17.0,
                run_count: 2,
            }]
        );
    }

    #[test]
    fn test_most_recent_week_first_and_rounding() {
        let runs = vec![
            run("a", (2024, 1, 1), 1.04, 0.0),
            run("b", (2024, 2, 1), 3.0, 56.0),
            run("c", (2023, 12, 31), 2.0, 0.0),
        ];
        let stats = WeeklyStats::from_runs(&runs);
        let weeks: Vec<&str> = stats.iter().map(|s| s.week.as_str()).collect();
        assert_eq!(weeks, vec!["2024-W05", "2024-W01", "2023-W52"]);
        assert_eq!(stats[0].total_points, 3.6);
        assert_eq!(stats[1].total_points, 1.0);
    }

    #[test]
    fn test_empty() {
        assert!(WeeklyStats::from_runs(&[]).is_empty());
    }
}
