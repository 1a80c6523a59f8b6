//! Session lifecycle: login, restore from the on-disk vault, and logout.
//!
//! The vault file is JSON `{version, checksum, payload}` where `payload` is
//! base64 of the stored auth record and `checksum` is the hex SHA-256 of the
//! decoded payload. Version 1 files held a bare `{"token": ...}` and are
//! rewritten as version 2 the first time they are read.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use affiliate_api::{Claims, ConsoleApi, Credentials};
use affiliate_core::{ConsoleError, ConsoleResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::auth::{AuthAction, Identity};
use crate::permissions::Route;
use crate::store::{AppAction, SharedStore};

const VAULT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct VaultFile {
    version: u32,
    checksum: String,
    payload: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredAuth {
    token: String,
}

fn sha256_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// Persisted token storage.
#[derive(Debug, Clone)]
pub struct SessionVault {
    path: PathBuf,
}

impl SessionVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, token: &str) -> ConsoleResult<()> {
        let payload = serde_json::to_vec(&StoredAuth {
            token: token.to_string(),
        })?;
        let file = VaultFile {
            version: VAULT_VERSION,
            checksum: sha256_hex(&payload),
            payload: STANDARD.encode(&payload),
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&file)?)?;
        Ok(())
    }

    /// The stored token, or `None` when no vault file exists.
    pub fn load(&self) -> ConsoleResult<Option<String>> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let value: Value = serde_json::from_slice(&raw)
            .map_err(|e| ConsoleError::Session(format!("vault is not JSON: {e}")))?;

        if value.get("version").is_none() {
            let legacy: StoredAuth = serde_json::from_value(value)
                .map_err(|e| ConsoleError::Session(format!("unrecognised vault layout: {e}")))?;
            info!(path = %self.path.display(), "Migrating version 1 session vault");
            self.save(&legacy.token)?;
            return Ok(Some(legacy.token));
        }

        let file: VaultFile = serde_json::from_value(value)
            .map_err(|e| ConsoleError::Session(format!("malformed vault: {e}")))?;
        if file.version != VAULT_VERSION {
            return Err(ConsoleError::Session(format!(
                "unsupported vault version {}",
                file.version
            )));
        }
        let payload = STANDARD
            .decode(file.payload.as_bytes())
            .map_err(|e| ConsoleError::Session(format!("vault payload is not base64: {e}")))?;
        if sha256_hex(&payload) != file.checksum {
            return Err(ConsoleError::Session("vault checksum mismatch".to_string()));
        }
        let stored: StoredAuth = serde_json::from_slice(&payload)
            .map_err(|e| ConsoleError::Session(format!("malformed vault payload: {e}")))?;
        Ok(Some(stored.token))
    }

    pub fn clear(&self) -> ConsoleResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Owns the authenticated API client and keeps the auth slice, the vault
/// and the client's bearer token in step.
pub struct Session<A> {
    api: Arc<A>,
    store: SharedStore,
    vault: SessionVault,
}

impl<A: ConsoleApi> Session<A> {
    pub fn new(api: Arc<A>, store: SharedStore, vault: SessionVault) -> Self {
        Self { api, store, vault }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn vault(&self) -> &SessionVault {
        &self.vault
    }

    pub fn identity(&self) -> Option<Identity> {
        self.store.read().auth.identity().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.read().auth.is_authenticated()
    }

    pub async fn login(&self, credentials: &Credentials) -> ConsoleResult<Identity> {
        let token = self.api.login(credentials).await?;
        // Nothing is authenticated until the token decodes and is on disk.
        Claims::decode(&token)?;
        self.vault.save(&token)?;
        let identity = self.install(token)?;
        info!(user = %identity.email, role = %identity.role, "Logged in");
        Ok(identity)
    }

    pub fn restore(&self) -> ConsoleResult<Option<Identity>> {
        self.restore_at(Utc::now())
    }

    /// Rehydrate from the vault without a network call. An expired,
    /// unreadable or tampered vault is deleted.
    pub fn restore_at(&self, now: DateTime<Utc>) -> ConsoleResult<Option<Identity>> {
        let token = match self.vault.load() {
            Ok(Some(token)) => token,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session vault");
                self.vault.clear()?;
                return Ok(None);
            }
        };
        match Claims::decode(&token) {
            Ok(claims) if !claims.is_expired_at(now) => {
                let identity = self.install(token)?;
                info!(user = %identity.email, "Session restored");
                Ok(Some(identity))
            }
            Ok(claims) => {
                info!(user = %claims.email, exp = claims.exp, "Persisted session expired");
                self.vault.clear()?;
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Discarding undecodable session token");
                self.vault.clear()?;
                Ok(None)
            }
        }
    }

    /// Clear the vault and the auth slice. Returns where to navigate next.
    pub fn logout(&self) -> Route {
        if let Err(e) = self.vault.clear() {
            warn!(error = %e, path = %self.vault.path().display(), "Could not remove session vault");
        }
        self.api.set_token(None);
        self.store
            .write()
            .dispatch(AppAction::Auth(AuthAction::LoggedOut));
        info!("Logged out");
        Route::Login
    }

    fn install(&self, token: String) -> ConsoleResult<Identity> {
        let claims = Claims::decode(&token)?;
        let identity = Identity::from_claims(&claims);
        self.api.set_token(Some(token.clone()));
        self.store.write().dispatch(AppAction::Auth(AuthAction::LoggedIn {
            token,
            identity: identity.clone(),
        }));
        Ok(identity)
    }
}
