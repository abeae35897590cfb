// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Run and credential use cases over the local stores.

use crate::db::LocalDb;
use crate::error::ClientError;
use crate::ids;
use crate::models::{Credentials, NewTrailRun, TrailRun, WeeklyStats};

/// Manual run tracking, weekly scores and the credentials record.
#[derive(Clone)]
pub struct TrailRunTracker {
    db: LocalDb,
}

impl TrailRunTracker {
    pub fn new(db: LocalDb) -> Self {
        Self { db }
    }

    pub async fn runs(&self) -> Result<Vec<TrailRun>, ClientError> {
        self.db.list_runs().await
    }

    /// Record a run entered by hand.
    pub async fn add_run(&self, run: NewTrailRun) -> Result<TrailRun, ClientError> {
        let id = ids::run_id().map_err(|_| ClientError::Random)?;
        let run = TrailRun::from_new(id, run);
        self.db.save_run(&run).await?;
        Ok(run)
    }

    /// Replace a stored run (same ID).
    pub async fn update_run(&self, run: &TrailRun) -> Result<(), ClientError> {
        self.db.save_run(run).await
    }

    pub async fn delete_run(&self, id: &str) -> Result<bool, ClientError> {
        self.db.delete_run(id).await
    }

    /// Delete every run of an ISO week (`YYYY-Www`). Returns how many went.
    pub async fn delete_week(&self, week_key: &str) -> Result<usize, ClientError> {
        let runs = self.db.list_runs().await?;
        let mut deleted = 0;
        for run in runs.iter().filter(|r| r.week_key() == week_key) {
            if self.db.delete_run(&run.id).await? {
                deleted += 1;
            }
        }
        tracing::info!(week = week_key, deleted, "Deleted week");
        Ok(deleted)
    }

    pub async fn weekly_stats(&self) -> Result<Vec<WeeklyStats>, ClientError> {
        let runs = self.db.list_runs().await?;
        Ok(WeeklyStats::from_runs(&runs))
    }

    // ─── Credentials ─────────────────────────────────────────────

    pub async fn save_credentials(&self, credentials: &Credentials) -> Result<(), ClientError> {
        self.db.save_credentials(credentials).await
    }

    pub async fn credentials(&self) -> Result<Option<Credentials>, ClientError> {
        self.db.get_credentials().await
    }

    /// Forget the client credentials and any linked account.
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.db.clear_credentials().await
    }
}
