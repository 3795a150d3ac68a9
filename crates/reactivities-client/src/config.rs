//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the client runs against a local backend
//! with zero configuration.

use std::time::Duration;

use reactivities_shared::CurrentUser;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the activities API, without a trailing slash.
    /// Env: `REACTIVITIES_API_URL`
    /// Default: `http://localhost:5000/api`
    pub api_url: String,

    /// Per-request timeout.
    /// Env: `REACTIVITIES_TIMEOUT_SECS`
    /// Default: `30`
    pub request_timeout: Duration,

    /// The acting user.
    /// Env: `REACTIVITIES_USERNAME`, `REACTIVITIES_DISPLAY_NAME`,
    /// `REACTIVITIES_IMAGE`
    /// Default: `guest` / `Guest` / none.
    pub user: CurrentUser,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000/api".to_string(),
            request_timeout: Duration::from_secs(30),
            user: CurrentUser::new("guest", "Guest"),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of an
    /// environment variable if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("REACTIVITIES_API_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                config.api_url = url.to_string();
            } else {
                tracing::warn!(value = %url, "Invalid REACTIVITIES_API_URL, using default");
            }
        }

        if let Some(val) = lookup("REACTIVITIES_TIMEOUT_SECS") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Duration::from_secs(secs),
                _ => {
                    tracing::warn!(value = %val, "Invalid REACTIVITIES_TIMEOUT_SECS, using default");
                }
            }
        }

        if let Some(username) = lookup("REACTIVITIES_USERNAME") {
            if !username.is_empty() {
                config.user.display_name = username.clone();
                config.user.username = username;
            }
        }

        if let Some(name) = lookup("REACTIVITIES_DISPLAY_NAME") {
            if !name.is_empty() {
                config.user.display_name = name;
            }
        }

        if let Some(image) = lookup("REACTIVITIES_IMAGE") {
            if !image.is_empty() {
                config.user.image = Some(image);
            }
        }

        config
    }
}
