// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local persistence (JSON records under fixed keys).

pub mod local;

pub use local::LocalDb;

/// Storage keys as constants.
pub mod keys {
    pub const TRAIL_RUNS: &str = "coach-trail-runs";
    pub const CREDENTIALS: &str = "coach-trail-polar-credentials";
    /// Pending OAuth authorization (state + PKCE verifier)
    pub const OAUTH_PENDING: &str = "coach-trail-oauth-pending";
}
