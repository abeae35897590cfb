// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.
//!
//! `polar` and `sync` run inside the relay; `oauth`, `relay_client`,
//! `importer` and `tracker` are the front end's side.

pub mod importer;
pub mod oauth;
pub mod polar;
pub mod relay_client;
pub mod sync;
pub mod tracker;

pub use importer::{SyncResult, SyncTrailRuns, TrailRunImporter};
pub use oauth::{
    parse_callback_params, CallbackParams, FileSessionStore, MemorySessionStore, OAuthFlow,
    PendingAuthorization, SessionStore,
};
pub use polar::{PolarClient, Registration};
pub use relay_client::RelayClient;
pub use sync::{ExerciseFailure, ExerciseSync, SyncOutcome};
pub use tracker::TrailRunTracker;
