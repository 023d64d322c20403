use crate::config::HttpConfig;
use crate::envelope::Envelope;
use crate::error::HttpError;
use crate::interceptors::{Interceptors, MemoryTokenStore, RequestStage, ResponseStage};
use crate::options::ClientOptions;
use once_cell::sync::OnceCell;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

static DEFAULT_CLIENT: OnceCell<HttpClient> = OnceCell::new();

/// A reqwest client with its base URL and interceptor chain. Cloning is cheap
/// and clones share the same chain.
#[derive(Clone)]
pub struct HttpClient {
    inner: ClientWithMiddleware,
    base_url: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Builds a client with the standard interceptors and an empty token store.
pub fn create_client(options: ClientOptions) -> Result<HttpClient, HttpError> {
    let tokens = Arc::new(MemoryTokenStore::default());
    create_client_with(options, Interceptors::standard(tokens))
}

pub fn create_client_with(
    options: ClientOptions,
    interceptors: Interceptors,
) -> Result<HttpClient, HttpError> {
    let options = ClientOptions::defaults().merge(options);
    let timeout = options.effective_timeout();

    let mut builder = reqwest::Client::builder().timeout(timeout);
    if let Some(connect_timeout) = options.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if let Some(user_agent) = options.user_agent {
        builder = builder.user_agent(user_agent);
    }
    if let Some(headers) = options.headers {
        builder = builder.default_headers(headers);
    }

    let transport = builder.build().map_err(HttpError::Build)?;

    let Interceptors { request, response } = interceptors;
    let inner = ClientBuilder::new(transport)
        .with(RequestStage::new(request))
        .with(ResponseStage::new(response))
        .build();

    debug!(
        "Created HTTP client, base URL: {:?}, timeout: {}ms",
        options.base_url,
        timeout.as_millis()
    );

    Ok(HttpClient {
        inner,
        base_url: options.base_url,
        timeout,
    })
}

/// Installs the process-wide client on first call. Later calls return the
/// same instance and ignore their config.
pub fn init_default_client(config: &HttpConfig) -> Result<&'static HttpClient, HttpError> {
    DEFAULT_CLIENT.get_or_try_init(|| {
        let tokens = Arc::new(MemoryTokenStore::new(config.token.clone()));
        let client = create_client_with(config.client_options(), Interceptors::standard(tokens))?;
        info!(
            "Default HTTP client ready, base URL: {}",
            client.base_url().unwrap_or("<unset>")
        );
        Ok(client)
    })
}

pub fn default_client() -> Result<&'static HttpClient, HttpError> {
    DEFAULT_CLIENT.get().ok_or(HttpError::NotInitialized)
}

impl HttpClient {
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &ClientWithMiddleware {
        &self.inner
    }

    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, HttpError> {
        let url = resolve_url(self.base_url.as_deref(), path)?;
        Ok(self.inner.request(method, url))
    }

    pub fn get(&self, path: &str) -> Result<RequestBuilder, HttpError> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> Result<RequestBuilder, HttpError> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> Result<RequestBuilder, HttpError> {
        self.request(Method::PUT, path)
    }

    pub fn delete(&self, path: &str) -> Result<RequestBuilder, HttpError> {
        self.request(Method::DELETE, path)
    }

    /// Sends `request` and unwraps the `{code, msg, data}` envelope into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, HttpError> {
        let response = request.send().await?;
        let status = i64::from(response.status().as_u16());
        let bytes = response.bytes().await.map_err(HttpError::Transport)?;
        let envelope: Envelope = serde_json::from_slice(&bytes)?;
        envelope.into_data(status)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpError> {
        let request = self.get(path)?;
        self.fetch(request).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec(body)?;
        let request = self
            .post(path)?
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        self.fetch(request).await
    }
}

/// Joins `path` onto `base_url` with exactly one slash between them. Absolute
/// URLs are used as given. Protocol-relative paths (`//host/..`) have no page
/// scheme to borrow and are rejected.
pub fn resolve_url(base_url: Option<&str>, path: &str) -> Result<Url, HttpError> {
    if path.starts_with("//") {
        return Err(HttpError::InvalidUrl(format!(
            "{}: protocol-relative URLs need an explicit scheme",
            path
        )));
    }

    let full = if has_scheme(path) {
        path.to_string()
    } else {
        let base = base_url.ok_or_else(|| HttpError::MissingBaseUrl(path.to_string()))?;
        if path.is_empty() {
            base.to_string()
        } else {
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
    };

    Url::parse(&full).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", full, e)))
}

fn has_scheme(path: &str) -> bool {
    let Some(idx) = path.find("://") else {
        return false;
    };
    let scheme = &path[..idx];

    scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
