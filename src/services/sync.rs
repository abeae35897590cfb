// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise transaction sync.
//!
//! One sync runs the AccessLink transaction strictly in order:
//! 1. Open a transaction (no ID means nothing new, done)
//! 2. List the exercise URLs of the transaction
//! 3. Fetch each exercise; failures are recorded and skipped
//! 4. Commit the transaction, even after partial failures
//!
//! A commit discards the exercises of that transaction upstream for good,
//! so an exercise whose fetch failed is not offered again.

use chrono::Utc;

use crate::error::AppError;
use crate::ids;
use crate::models::Activity;
use crate::services::polar::{PolarClient, PolarExercise};
use crate::time_utils::format_utc_rfc3339;

/// Sport assumed when Polar omits one.
const DEFAULT_SPORT: &str = "RUNNING";

/// An exercise that could not be fetched or mapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseFailure {
    pub url: String,
    pub reason: String,
}

/// Result of one sync: mapped activities in list order, plus the
/// exercises that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncOutcome {
    /// Transaction that was opened and committed, if any
    pub transaction_id: Option<String>,
    pub activities: Vec<Activity>,
    pub failures: Vec<ExerciseFailure>,
}

/// Runs the exercise-transaction protocol against AccessLink.
#[derive(Clone)]
pub struct ExerciseSync {
    polar: PolarClient,
}

impl ExerciseSync {
    pub fn new(polar: PolarClient) -> Self {
        Self { polar }
    }

    /// Pull every exercise recorded since the last committed transaction.
    pub async fn run(&self, access_token: &str, user_id: &str) -> Result<SyncOutcome, AppError> {
        let Some(transaction_id) = self
            .polar
            .create_transaction(access_token, user_id)
            .await?
        else {
            tracing::info!(user_id, "No new exercises");
            return Ok(SyncOutcome::default());
        };

        let urls = self
            .polar
            .list_exercises(access_token, user_id, &transaction_id)
            .await?;
        tracing::info!(
            user_id,
            transaction_id = %transaction_id,
            count = urls.len(),
            "Exercise transaction opened"
        );

        let mut outcome = SyncOutcome {
            transaction_id: Some(transaction_id.clone()),
            ..SyncOutcome::default()
        };

        for url in urls {
            let fetched = self
                .polar
                .get_exercise(access_token, &url)
                .await
                .and_then(map_exercise);

            match fetched {
                Ok(activity) => outcome.activities.push(activity),
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Skipping exercise");
                    outcome.failures.push(ExerciseFailure {
                        url,
                        reason: e.to_string(),
                    });
                }
            }
        }

        self.polar
            .commit_transaction(access_token, user_id, &transaction_id)
            .await?;

        tracing::info!(
            user_id,
            transaction_id = %transaction_id,
            fetched = outcome.activities.len(),
            failed = outcome.failures.len(),
            "Exercise sync complete"
        );

        Ok(outcome)
    }
}

/// Map a Polar exercise to an [`Activity`], filling the documented defaults.
pub fn map_exercise(exercise: PolarExercise) -> Result<Activity, AppError> {
    let id = match exercise.id {
        Some(id) => id,
        None => ids::activity_id()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Random generator failure")))?,
    };

    Ok(Activity {
        id,
        date: exercise
            .start_time
            .unwrap_or_else(|| format_utc_rfc3339(Utc::now())),
        sport: exercise.sport.unwrap_or_else(|| DEFAULT_SPORT.to_string()),
        distance_meters: exercise.distance,
        ascent_meters: exercise.ascent,
        duration: exercise.duration,
    })
}
