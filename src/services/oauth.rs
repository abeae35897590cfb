// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Polar OAuth2 authorization-code flow, front-end side.
//!
//! The flow spans a full browser navigation: `initiate_authorization`
//! persists a [`PendingAuthorization`] in a [`SessionStore`] and hands back
//! the Polar URL; the callback carries the code and state back, and
//! `exchange_code_for_token` checks the state and asks the relay for the
//! token. The pending authorization is cleared whenever an exchange ends,
//! whether it succeeded, failed upstream, or was rejected as CSRF.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Mutex;
use subtle::ConstantTimeEq;

use crate::config::Config;
use crate::db::{keys, LocalDb};
use crate::error::ClientError;
use crate::ids;
use crate::models::{Credentials, RegisterResponse, TokenRequest, TokenResponse};
use crate::services::RelayClient;

/// AccessLink scope requested at authorization.
pub const SCOPE: &str = "accesslink.read_all";

/// State bytes (before base64).
const STATE_BYTES: usize = 16;
/// PKCE verifier bytes (43 base64 chars, the RFC 7636 minimum).
const VERIFIER_BYTES: usize = 32;

/// Correlates an authorization request with its callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAuthorization {
    pub state: String,
    pub code_verifier: String,
}

/// Session-scoped storage for the one pending authorization.
///
/// Must survive the redirect to Polar and back.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<PendingAuthorization>, ClientError>;
    fn save(&self, pending: &PendingAuthorization) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

/// In-process session store.
#[derive(Default)]
pub struct MemorySessionStore {
    pending: Mutex<Option<PendingAuthorization>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PendingAuthorization>, ClientError> {
        let guard = self
            .pending
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, pending: &PendingAuthorization) -> Result<(), ClientError> {
        let mut guard = self
            .pending
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        *guard = Some(pending.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        let mut guard = self
            .pending
            .lock()
            .map_err(|_| ClientError::Storage("session lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Session store kept as a JSON file, so a pending authorization outlives
/// the process that started it.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: data_dir
                .into()
                .join(format!("{}.json", keys::OAUTH_PENDING)),
        }
    }

    /// Store under the configured data directory, next to the local records.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.data_dir)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PendingAuthorization>, ClientError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw).ok()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }

    fn save(&self, pending: &PendingAuthorization) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }
        let raw =
            serde_json::to_string(pending).map_err(|e| ClientError::Storage(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| ClientError::Storage(e.to_string()))
    }

    fn clear(&self) -> Result<(), ClientError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Storage(e.to_string())),
        }
    }
}

/// Clears the pending authorization when dropped.
struct PendingGuard<'a, S: SessionStore> {
    store: &'a S,
}

impl<'a, S: SessionStore> PendingGuard<'a, S> {
    fn acquire(store: &'a S) -> Result<(Self, Option<PendingAuthorization>), ClientError> {
        let guard = Self { store };
        let pending = store.load()?;
        Ok((guard, pending))
    }
}

impl<S: SessionStore> Drop for PendingGuard<'_, S> {
    fn drop(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear pending OAuth state");
        }
    }
}

/// `code` and `state` from a Polar redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

/// Extract the callback parameters from the redirect URL.
///
/// Returns `Ok(None)` when the URL is not a callback (no code or no state,
/// or not a URL at all) and an error when Polar reports one.
pub fn parse_callback_params(url: &str) -> Result<Option<CallbackParams>, ClientError> {
    let Ok(url) = reqwest::Url::parse(url) else {
        return Ok(None);
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Err(ClientError::Authorization {
            error,
            description: description.unwrap_or_default(),
        });
    }

    match (code, state) {
        (Some(code), Some(state)) if !code.is_empty() && !state.is_empty() => {
            Ok(Some(CallbackParams { code, state }))
        }
        _ => Ok(None),
    }
}

/// Drives the authorization flow against the relay.
pub struct OAuthFlow<S: SessionStore> {
    session: S,
    relay: RelayClient,
    authorization_url: String,
}

impl<S: SessionStore> OAuthFlow<S> {
    pub fn new(session: S, relay: RelayClient, authorization_url: &str) -> Self {
        Self {
            session,
            relay,
            authorization_url: authorization_url.to_string(),
        }
    }

    /// Flow against the Polar authorization page named in `config`.
    pub fn from_config(session: S, relay: RelayClient, config: &Config) -> Self {
        Self::new(session, relay, &config.polar_authorization_url)
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Start an authorization: store a fresh state and PKCE verifier and
    /// return the Polar URL the user agent must navigate to.
    ///
    /// Starting again replaces any earlier pending authorization.
    pub fn initiate_authorization(
        &self,
        client_id: &str,
        redirect_uri: &str,
    ) -> Result<String, ClientError> {
        let pending = PendingAuthorization {
            state: ids::random_token(STATE_BYTES).map_err(|_| ClientError::Random)?,
            code_verifier: ids::random_token(VERIFIER_BYTES).map_err(|_| ClientError::Random)?,
        };
        self.session.save(&pending)?;

        let url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&code_challenge={}&code_challenge_method=S256&state={}",
            self.authorization_url,
            urlencoding::encode(client_id.trim()),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(SCOPE),
            code_challenge(&pending.code_verifier),
            pending.state
        );

        tracing::info!(client_id = %client_id.trim(), "Starting Polar authorization");
        Ok(url)
    }

    /// Verify `state` and exchange `code` for an access token via the relay.
    ///
    /// A state mismatch fails without contacting the relay.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        state: &str,
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, ClientError> {
        let (_guard, pending) = PendingGuard::acquire(&self.session)?;

        let Some(pending) = pending.filter(|p| states_match(&p.state, state)) else {
            tracing::warn!("OAuth state mismatch, rejecting callback");
            return Err(ClientError::CsrfMismatch);
        };

        let request = TokenRequest {
            code: Some(code.to_string()),
            client_id: Some(client_id.trim().to_string()),
            client_secret: Some(client_secret.trim().to_string()),
            redirect_uri: Some(redirect_uri.to_string()),
            code_verifier: Some(pending.code_verifier),
        };
        self.relay.exchange_token(&request).await
    }

    /// Link the token to a Polar user ID. Succeeds for accounts that are
    /// already registered, with `already_registered` set.
    pub async fn register_user(&self, access_token: &str) -> Result<RegisterResponse, ClientError> {
        let member_id = ids::member_id().map_err(|_| ClientError::Random)?;
        self.relay.register(access_token, Some(member_id)).await
    }

    /// Handle a callback URL end to end: exchange, register, and store the
    /// token and user ID with the saved client credentials.
    ///
    /// Returns `Ok(None)` when `callback_url` is not a callback.
    pub async fn complete_authorization(
        &self,
        callback_url: &str,
        redirect_uri: &str,
        db: &LocalDb,
    ) -> Result<Option<Credentials>, ClientError> {
        let Some(params) = parse_callback_params(callback_url)? else {
            return Ok(None);
        };

        let mut credentials = db
            .get_credentials()
            .await?
            .filter(Credentials::is_valid)
            .ok_or(ClientError::NotConfigured)?;

        let token = self
            .exchange_code_for_token(
                &params.code,
                &params.state,
                &credentials.client_id,
                &credentials.client_secret,
                redirect_uri,
            )
            .await?;
        let registration = self.register_user(&token.access_token).await?;

        tracing::info!(
            already_registered = registration.already_registered,
            "Polar account linked"
        );

        credentials.access_token = Some(token.access_token);
        credentials.user_id = Some(registration.user_id);
        db.save_credentials(&credentials).await?;

        Ok(Some(credentials.trimmed()))
    }
}

/// PKCE S256 challenge for a verifier.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn states_match(expected: &str, received: &str) -> bool {
    expected.as_bytes().ct_eq(received.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_challenge_rfc7636_vector() {
        // Appendix B of RFC 7636
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_states_match() {
        assert!(states_match("abc", "abc"));
        assert!(!states_match("abc", "abd"));
        assert!(!states_match("abc", "ab"));
        assert!(!states_match("abc", ""));
    }

    #[test]
    fn test_memory_session_store() {
        let store = MemorySessionStore::default();
        assert_eq!(store.load().unwrap(), None);

        let pending = PendingAuthorization {
            state: "s".to_string(),
            code_verifier: "v".to_string(),
        };
        store.save(&pending).unwrap();
        assert_eq!(store.load().unwrap(), Some(pending));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_session_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let pending = PendingAuthorization {
            state: "s".to_string(),
            code_verifier: "v".to_string(),
        };
        FileSessionStore::new(dir.path()).save(&pending).unwrap();

        let reopened = FileSessionStore::new(dir.path());
        assert_eq!(reopened.load().unwrap(), Some(pending));
        reopened.clear().unwrap();
        reopened.clear().unwrap();
        assert_eq!(reopened.load().unwrap(), None);
    }

    #[test]
    fn test_guard_clears_on_drop() {
        let store = MemorySessionStore::default();
        store
            .save(&PendingAuthorization {
                state: "s".to_string(),
                code_verifier: "v".to_string(),
            })
            .unwrap();
        {
            let (_guard, pending) = PendingGuard::acquire(&store).unwrap();
            assert!(pending.is_some());
        }
        assert_eq!(store.load().unwrap(), None);
    }
}
