//! Admin session.
//!
//! Credentials are checked by an [`AuthProvider`]. The only provider shipped is a
//! shared secret, which is not a production scheme: there is no per-user identity,
//! lockout or backoff. Expiry is evaluated lazily on every check.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::clock::Clock;
use crate::storage::{keys, read_raw, KeyValueStore};
use crate::{Result, StorefrontError};

pub trait AuthProvider: Send + Sync {
    fn verify(&self, password: &str) -> bool;
}

#[derive(Clone)]
pub struct SharedSecretAuth {
    secret: String,
}

impl SharedSecretAuth {
    pub fn new(secret: impl Into<String>) -> Self { Self { secret: secret.into() } }
}

impl AuthProvider for SharedSecretAuth {
    fn verify(&self, password: &str) -> bool {
        password.as_bytes().ct_eq(self.secret.as_bytes()).into()
    }
}

impl std::fmt::Debug for SharedSecretAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecretAuth(..)")
    }
}

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    auth: Arc<dyn AuthProvider>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, auth: Arc<dyn AuthProvider>, lifetime: Duration) -> Self {
        Self { store, clock, auth, lifetime }
    }

    pub fn login(&self, password: &str) -> Result<()> {
        if !self.auth.verify(password) {
            tracing::warn!("admin login rejected");
            return Err(StorefrontError::Auth);
        }
        let now = self.clock.now();
        self.store.set(keys::ADMIN_AUTHENTICATED, "true")?;
        self.store.set(keys::ADMIN_LOGIN_TIME, &now.to_rfc3339())?;
        tracing::info!(at = %now, "admin logged in");
        Ok(())
    }

    /// True while the stored login is younger than the session lifetime. An
    /// expired, future-dated or unreadable session is cleared as part of the check.
    pub fn is_authenticated(&self) -> bool {
        if read_raw(self.store.as_ref(), keys::ADMIN_AUTHENTICATED).as_deref() != Some("true") {
            return false;
        }
        let now = self.clock.now();
        match self.login_time() {
            Some(at) if at <= now && now - at < self.lifetime => true,
            login_time => {
                tracing::info!(?login_time, "admin session expired");
                self.clear();
                false
            }
        }
    }

    pub fn login_time(&self) -> Option<DateTime<Utc>> {
        let raw = read_raw(self.store.as_ref(), keys::ADMIN_LOGIN_TIME)?;
        DateTime::parse_from_rfc3339(&raw).ok().map(|t| t.with_timezone(&Utc))
    }

    pub fn logout(&self) -> Result<()> {
        self.store.remove(keys::ADMIN_AUTHENTICATED)?;
        self.store.remove(keys::ADMIN_LOGIN_TIME)?;
        tracing::info!("admin logged out");
        Ok(())
    }

    fn clear(&self) {
        if let Err(err) = self.logout() {
            tracing::warn!(error = %err, "could not clear expired session");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("lifetime", &self.lifetime).finish_non_exhaustive()
    }
}
