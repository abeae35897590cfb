// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON record store with typed operations.
//!
//! Provides high-level operations for:
//! - Trail runs (the run store)
//! - Polar credentials (the credential store)
//!
//! Each key holds one JSON document. Records are written to
//! `<data_dir>/<key>.json`, or kept in memory for tests.

use crate::config::Config;
use crate::db::keys;
use crate::error::ClientError;
use crate::models::{Credentials, TrailRun};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
enum Backend {
    Dir(PathBuf),
    Memory(Arc<DashMap<String, String>>),
}

/// Local database client.
#[derive(Clone)]
pub struct LocalDb {
    backend: Backend,
}

impl LocalDb {
    /// Open (creating if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error(&dir, e))?;

        tracing::info!(path = %dir.display(), "Opened local store");
        Ok(Self {
            backend: Backend::Dir(dir),
        })
    }

    /// Open the store in the configured `DATA_DIR`.
    pub async fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::open(&config.data_dir).await
    }

    /// In-memory store (nothing touches the disk).
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(DashMap::new())),
        }
    }

    // ─── Trail Runs ──────────────────────────────────────────────

    /// All stored runs, in insertion order. A corrupt record reads as empty.
    pub async fn list_runs(&self) -> Result<Vec<TrailRun>, ClientError> {
        Ok(self
            .read_json::<Vec<TrailRun>>(keys::TRAIL_RUNS)
            .await?
            .unwrap_or_default())
    }

    /// Replace the run with the same ID, or append it.
    pub async fn save_run(&self, run: &TrailRun) -> Result<(), ClientError> {
        let mut runs = self.list_runs().await?;
        match runs.iter_mut().find(|r| r.id == run.id) {
            Some(existing) => *existing = run.clone(),
            None => runs.push(run.clone()),
        }
        self.write_json(keys::TRAIL_RUNS, &runs).await
    }

    /// Delete a run by ID. Returns whether it existed.
    pub async fn delete_run(&self, id: &str) -> Result<bool, ClientError> {
        let mut runs = self.list_runs().await?;
        let before = runs.len();
        runs.retain(|r| r.id != id);
        if runs.len() == before {
            return Ok(false);
        }
        self.write_json(keys::TRAIL_RUNS, &runs).await?;
        Ok(true)
    }

    // ─── Credentials ─────────────────────────────────────────────

    pub async fn get_credentials(&self) -> Result<Option<Credentials>, ClientError> {
        self.read_json(keys::CREDENTIALS).await
    }

    /// Store credentials, trimmed of surrounding whitespace.
    pub async fn save_credentials(&self, credentials: &Credentials) -> Result<(), ClientError> {
        let trimmed = credentials.clone().trimmed();
        self.write_json(keys::CREDENTIALS, &trimmed).await
    }

    pub async fn clear_credentials(&self) -> Result<(), ClientError> {
        self.remove(keys::CREDENTIALS).await
    }

    // ─── Raw records ─────────────────────────────────────────────

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let Some(raw) = self.read(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring corrupt record");
                Ok(None)
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), ClientError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| ClientError::Storage(format!("Failed to encode {}: {}", key, e)))?;
        self.write(key, raw).await
    }

    async fn read(&self, key: &str) -> Result<Option<String>, ClientError> {
        match &self.backend {
            Backend::Memory(map) => Ok(map.get(key).map(|v| v.value().clone())),
            Backend::Dir(dir) => {
                let path = record_path(dir, key);
                match tokio::fs::read_to_string(&path).await {
                    Ok(raw) => Ok(Some(raw)),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
                    Err(e) => Err(storage_error(&path, e)),
                }
            }
        }
    }

    async fn write(&self, key: &str, raw: String) -> Result<(), ClientError> {
        match &self.backend {
            Backend::Memory(map) => {
                map.insert(key.to_string(), raw);
                Ok(())
            }
            Backend::Dir(dir) => {
                // Write-then-rename so a crash never leaves half a record.
                let path = record_path(dir, key);
                let tmp = path.with_extension("json.tmp");
                tokio::fs::write(&tmp, raw)
                    .await
                    .map_err(|e| storage_error(&tmp, e))?;
                tokio::fs::rename(&tmp, &path)
                    .await
                    .map_err(|e| storage_error(&path, e))
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        match &self.backend {
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
            Backend::Dir(dir) => {
                let path = record_path(dir, key);
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(storage_error(&path, e)),
                }
            }
        }
    }
}

fn record_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{}.json", key))
}

fn storage_error(path: &Path, e: std::io::Error) -> ClientError {
    ClientError::Storage(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn run(id: &str, day: u32) -> TrailRun {
        TrailRun {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            distance_km: 10.0,
            elevation_gain_m: 100.0,
        }
    }

    #[tokio::test]
    async fn test_save_replaces_by_id() {
        let db = LocalDb::new_mock();
        db.save_run(&run("a", 1)).await.unwrap();
        db.save_run(&run("b", 2)).await.unwrap();

        let mut updated = run("a", 1);
        updated.distance_km = 12.5;
        db.save_run(&updated).await.unwrap();

        let runs = db.list_runs().await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].id, "a");
        assert_eq!(runs[0].distance_km, 12.5);
    }

    #[tokio::test]
    async fn test_delete_run() {
        let db = LocalDb::new_mock();
        db.save_run(&run("a", 1)).await.unwrap();

        assert!(db.delete_run("a").await.unwrap());
        assert!(!db.delete_run("a").await.unwrap());
        assert!(db.list_runs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_credentials_trimmed_and_cleared() {
        let db = LocalDb::new_mock();
        let creds = Credentials {
            client_id: " id ".to_string(),
            client_secret: "secret\n".to_string(),
            access_token: Some("tok ".to_string()),
            user_id: Some("42".to_string()),
        };
        db.save_credentials(&creds).await.unwrap();

        let stored = db.get_credentials().await.unwrap().unwrap();
        assert_eq!(stored.client_id, "id");
        assert_eq!(stored.client_secret, "secret");
        assert_eq!(stored.access_token.as_deref(), Some("tok"));

        db.clear_credentials().await.unwrap();
        assert!(db.get_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_backend_persists_and_tolerates_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let db = LocalDb::open(dir.path()).await.unwrap();
        db.save_run(&run("a", 1)).await.unwrap();

        let reopened = LocalDb::open(dir.path()).await.unwrap();
        assert_eq!(reopened.list_runs().await.unwrap(), vec![run("a", 1)]);

        std::fs::write(dir.path().join("coach-trail-runs.json"), "{not json").unwrap();
        assert!(reopened.list_runs().await.unwrap().is_empty());
    }
}
