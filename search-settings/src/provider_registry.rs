//! # Provider registry (§4.8)
//!
//! Static metadata about auth providers: what kind of credential they
//! need, and (for OAuth) the endpoint and default scopes a host would use
//! to drive the browser-redirect flow. This crate never performs that
//! flow itself (out of scope, §1) — it only answers "what would a caller
//! need to know to start one".
//!
//! Shaped after `search-connector::registry::ConnectorRegistry`: a
//! `HashMap` keyed by name, populated at construction, read-only after.

use std::collections::HashMap;

use crate::error::{Result, SettingsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthCapability {
    None,
    Pat,
    OAuth,
    Both,
}

#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: &'static str,
    pub auth: AuthCapability,
    pub oauth_endpoint: Option<&'static str>,
    pub oauth_scopes: Vec<&'static str>,
}

impl ProviderInfo {
    pub fn supports_oauth(&self) -> bool {
        matches!(self.auth, AuthCapability::OAuth | AuthCapability::Both)
    }

    pub fn supports_pat(&self) -> bool {
        matches!(self.auth, AuthCapability::Pat | AuthCapability::Both)
    }
}

pub struct ProviderRegistry {
    providers: HashMap<String, ProviderInfo>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { providers: HashMap::new() }
    }

    /// A registry pre-populated with the auth providers implied by
    /// spec.md's own URI-scheme examples (`file://`, `github://`,
    /// `gcal://`, `dropbox://`); nothing here talks to a network, it is
    /// purely descriptive.
    pub fn with_known_providers() -> Self {
        let mut registry = Self::new();
        registry.register(ProviderInfo {
            name: "none",
            auth: AuthCapability::None,
            oauth_endpoint: None,
            oauth_scopes: Vec::new(),
        });
        registry.register(ProviderInfo {
            name: "github-pat",
            auth: AuthCapability::Pat,
            oauth_endpoint: None,
            oauth_scopes: Vec::new(),
        });
        registry.register(ProviderInfo {
            name: "google-oauth",
            auth: AuthCapability::OAuth,
            oauth_endpoint: Some("https://accounts.google.com/o/oauth2/v2/auth"),
            oauth_scopes: vec![
                "https://www.googleapis.com/auth/drive.readonly",
                "https://www.googleapis.com/auth/calendar.readonly",
            ],
        });
        registry.register(ProviderInfo {
            name: "dropbox-oauth",
            auth: AuthCapability::OAuth,
            oauth_endpoint: Some("https://www.dropbox.com/oauth2/authorize"),
            oauth_scopes: vec!["files.metadata.read", "files.content.read"],
        });
        registry
    }

    pub fn register(&mut self, info: ProviderInfo) {
        self.providers.insert(info.name.to_string(), info);
    }

    pub fn get(&self, name: &str) -> Result<&ProviderInfo> {
        self.providers
            .get(name)
            .ok_or_else(|| SettingsError::UnknownProvider(name.to_string()))
    }

    pub fn list(&self) -> impl Iterator<Item = &ProviderInfo> {
        self.providers.values()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_known_providers()
    }
}
