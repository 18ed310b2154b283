//! Client configuration and the per-session request context.
//!
//! Both are resolved once at start-up and passed down explicitly; nothing
//! below `main.rs` reads browser storage for credentials or settings.

use serde::{Deserialize, Serialize};

/// localStorage key holding the bearer credential written by the login flow.
pub const TOKEN_STORAGE_KEY: &str = "token";
/// localStorage key holding optional JSON overrides for [`ClientConfig`].
pub const CONFIG_STORAGE_KEY: &str = "tenderwriter.config";

/// Backend caps `limit` at 100.
const MAX_LIST_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for every REST path.
    pub api_base: String,
    /// `limit` sent with the proposal list request.
    pub proposal_list_limit: u32,
    /// How much of the buffer the "Improve current text" prompt embeds, in chars.
    pub improve_excerpt_chars: usize,
    /// Sent with every `/rag/query` call when set.
    pub query_temperature: Option<f32>,
    /// Sent with every `/rag/query` call when set.
    pub query_top_k: Option<u32>,
    /// How long the "Saved" chip stays up before returning to idle.
    pub saved_indicator_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "/api".to_string(),
            proposal_list_limit: 20,
            improve_excerpt_chars: 500,
            query_temperature: None,
            query_top_k: None,
            saved_indicator_ms: 2000,
        }
    }
}

impl ClientConfig {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(raw).map(Self::normalized)
    }

    /// Defaults overlaid with `localStorage["tenderwriter.config"]`, if any.
    pub fn from_browser() -> Self {
        let Some(raw) = read_local_storage(CONFIG_STORAGE_KEY) else {
            return Self::default();
        };
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring unparsable {CONFIG_STORAGE_KEY}: {e}");
                Self::default()
            }
        }
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.api_base.trim().trim_end_matches('/');
        self.api_base = trimmed.to_string();
        self.proposal_list_limit = self.proposal_list_limit.clamp(1, MAX_LIST_LIMIT);
        self.improve_excerpt_chars = self.improve_excerpt_chars.max(1);
        self
    }
}

/// Everything the transport needs to address and authenticate a request.
#[derive(Clone, PartialEq)]
pub struct RequestContext {
    api_base: String,
    token: Option<String>,
}

impl RequestContext {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let token = token.filter(|t| !t.trim().is_empty());
        Self { api_base, token }
    }

    /// Context for the running page: configured base plus the stored credential.
    pub fn from_browser(config: &ClientConfig) -> Self {
        Self::new(config.api_base.clone(), read_local_storage(TOKEN_STORAGE_KEY))
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base, path)
        } else {
            format!("{}/{}", self.api_base, path)
        }
    }

    /// `Authorization` header value, absent when logged out.
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    pub fn has_credential(&self) -> bool {
        self.token.is_some()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn read_local_storage(key: &str) -> Option<String> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    storage.get_item(key).ok().flatten()
}
