//! # Credentials / AuthProvider (§3) and the `SecretStore` port
//!
//! The core treats credential bundles as opaque beyond the fields it needs
//! to decide whether a token is still usable; it never interprets
//! protocol-specific detail (OAuth scopes, PAT formats, ...). Those live in
//! connector-specific config, not here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::ids::CredentialsId;

/// An opaque credential bundle referenced by a `Source`.
///
/// `access_secret`/`refresh_secret` never appear in `Debug` output in full;
/// the custom impl below redacts them the way the teacher's OAuth token
/// type does, since credentials frequently end up in logs via `{:?}` on a
/// containing struct.
#[derive(Clone)]
pub struct Credentials {
    pub id: CredentialsId,
    pub account_identifier: String,
    pub access_secret: String,
    pub refresh_secret: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credentials {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("account_identifier", &self.account_identifier)
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &self.refresh_secret.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Metadata about an auth provider (e.g. "google-oauth") as referenced by a
/// `Source`. The core never drives the browser-redirect flow itself (out
/// of scope, §1) — it only needs to know the provider exists and whether a
/// refresh is possible.
#[derive(Debug, Clone)]
pub struct AuthProvider {
    pub id: String,
    pub display_name: String,
    pub supports_refresh: bool,
}

/// Resolves and persists credential bundles. Implementations live outside
/// this crate (OAuth flows, keychain-backed stores, ...); the core only
/// calls through this port.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn get(&self, id: CredentialsId) -> Result<Credentials>;

    async fn save(&self, credentials: &Credentials) -> Result<()>;

    async fn delete(&self, id: CredentialsId) -> Result<()>;

    /// Exchanges a refresh secret for a new access secret. Returns
    /// `TokenRefreshFailed` on failure (§7).
    async fn refresh(&self, id: CredentialsId) -> Result<Credentials>;
}
