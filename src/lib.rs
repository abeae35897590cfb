// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Coach Trail: weekly trail-run scoring fed by Polar AccessLink.
//!
//! This crate provides the relay that holds the Polar OAuth exchange and
//! the exercise-transaction sync, plus the front-end side: the OAuth flow,
//! the relay client, and the local run and credential stores.

pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{ExerciseSync, PolarClient};

/// Shared relay state. Holds no per-user data: every request carries its
/// own tokens.
pub struct AppState {
    pub polar: PolarClient,
    pub exercise_sync: ExerciseSync,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, error::AppError> {
        let polar = PolarClient::new(config)?;
        Ok(Self {
            exercise_sync: ExerciseSync::new(polar.clone()),
            polar,
        })
    }
}
