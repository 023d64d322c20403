use reqwest::header::HeaderMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(12000);

/// Options handed to [`crate::http_client::create_client`]. Every field left as
/// `None` falls back to the default set by [`ClientOptions::defaults`] or,
/// failing that, to reqwest's own behaviour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    pub base_url: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    pub headers: Option<HeaderMap>,
}

impl ClientOptions {
    pub fn defaults() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Shallow merge: every key set on `overrides` replaces the one on `self`.
    pub fn merge(self, overrides: ClientOptions) -> Self {
        Self {
            timeout: overrides.timeout.or(self.timeout),
            base_url: overrides.base_url.or(self.base_url),
            connect_timeout: overrides.connect_timeout.or(self.connect_timeout),
            user_agent: overrides.user_agent.or(self.user_agent),
            headers: overrides.headers.or(self.headers),
        }
    }

    pub(crate) fn effective_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}
