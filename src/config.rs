use crate::options::ClientOptions;
use std::time::Duration;

pub const BASE_API_VAR: &str = "VITE_BASE_API";
pub const TIMEOUT_VAR: &str = "HTTP_TIMEOUT_MS";
pub const TOKEN_VAR: &str = "API_TOKEN";

/// Settings read once during startup and handed to the client factory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpConfig {
    pub base_api: Option<String>,
    pub timeout: Option<Duration>,
    pub token: Option<String>,
}

impl HttpConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_api = lookup(BASE_API_VAR).filter(|v| !v.trim().is_empty());

        let timeout = lookup(TIMEOUT_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let token = lookup(TOKEN_VAR).filter(|v| !v.is_empty());

        Self {
            base_api,
            timeout,
            token,
        }
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: self.timeout,
            base_url: self.base_api.clone(),
            ..Default::default()
        }
    }
}
