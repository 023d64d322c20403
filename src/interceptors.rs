//! Request and response interceptors.
//!
//! An interceptor pair is a success handler plus a failure handler. Each
//! client registers one request pair and one response pair on its reqwest
//! middleware chain, request pair first.

use crate::envelope::{resolve_error_message, ErrorBody};
use crate::error::{reject, ApiError};
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::sync::{Arc, RwLock};
use task_local_extensions::Extensions;
use tracing::{debug, info, warn};

pub const TOKEN_HEADER: &str = "token";

/// Why a response did not reach `on_response`.
#[derive(Debug)]
pub enum Rejection {
    /// The server answered with a status outside 2xx.
    Status(Response),
    /// No response: connection failure, timeout, or an error raised further
    /// down the chain.
    Transport(reqwest_middleware::Error),
}

impl Rejection {
    pub fn into_error(self) -> reqwest_middleware::Error {
        match self {
            Rejection::Status(response) => {
                let status = response.status();
                let code = i64::from(status.as_u16());
                reject(ApiError::new(
                    code,
                    resolve_error_message(code, status.canonical_reason()),
                ))
            }
            Rejection::Transport(err) => err,
        }
    }
}

#[async_trait]
pub trait RequestInterceptor: Send + Sync + 'static {
    async fn on_request(&self, request: Request) -> reqwest_middleware::Result<Request>;

    async fn on_request_error(&self, error: reqwest_middleware::Error) -> reqwest_middleware::Error {
        error
    }
}

#[async_trait]
pub trait ResponseInterceptor: Send + Sync + 'static {
    async fn on_response(&self, response: Response) -> reqwest_middleware::Result<Response>;

    /// Either recovers with a response or re-signals an error.
    async fn on_response_error(&self, rejection: Rejection) -> reqwest_middleware::Result<Response> {
        Err(rejection.into_error())
    }
}

/// The pair of interceptors a client is built with.
#[derive(Clone)]
pub struct Interceptors {
    pub request: Arc<dyn RequestInterceptor>,
    pub response: Arc<dyn ResponseInterceptor>,
}

impl Interceptors {
    pub fn new<Req, Res>(request: Req, response: Res) -> Self
    where
        Req: RequestInterceptor,
        Res: ResponseInterceptor,
    {
        Self {
            request: Arc::new(request),
            response: Arc::new(response),
        }
    }

    pub fn standard(tokens: Arc<dyn TokenStore>) -> Self {
        Self::new(
            AuthInterceptor::new(tokens.clone()),
            ErrorInterceptor::new(tokens),
        )
    }
}

pub(crate) struct RequestStage {
    interceptor: Arc<dyn RequestInterceptor>,
}

impl RequestStage {
    pub(crate) fn new(interceptor: Arc<dyn RequestInterceptor>) -> Self {
        Self { interceptor }
    }
}

#[async_trait]
impl Middleware for RequestStage {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let req = match self.interceptor.on_request(req).await {
            Ok(req) => req,
            Err(err) => return Err(self.interceptor.on_request_error(err).await),
        };

        next.run(req, extensions).await
    }
}

pub(crate) struct ResponseStage {
    interceptor: Arc<dyn ResponseInterceptor>,
}

impl ResponseStage {
    pub(crate) fn new(interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        Self { interceptor }
    }
}

#[async_trait]
impl Middleware for ResponseStage {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let rejection = match next.run(req, extensions).await {
            Ok(response) if response.status().is_success() => {
                return self.interceptor.on_response(response).await;
            }
            Ok(response) => Rejection::Status(response),
            Err(err) => Rejection::Transport(err),
        };

        self.interceptor.on_response_error(rejection).await
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn clear(&self);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    pub fn set(&self, token: impl Into<String>) {
        match self.token.write() {
            Ok(mut guard) => *guard = Some(token.into()),
            Err(_) => warn!("Token store lock poisoned, token not stored"),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(_) => {
                warn!("Token store lock poisoned, sending without token");
                None
            }
        }
    }

    fn clear(&self) {
        match self.token.write() {
            Ok(mut guard) => *guard = None,
            Err(_) => warn!("Token store lock poisoned, token not cleared"),
        }
    }
}

/// Attaches the stored token unless the caller already set one.
pub struct AuthInterceptor {
    tokens: Arc<dyn TokenStore>,
}

impl AuthInterceptor {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl RequestInterceptor for AuthInterceptor {
    async fn on_request(&self, mut request: Request) -> reqwest_middleware::Result<Request> {
        if !request.headers().contains_key(TOKEN_HEADER) {
            if let Some(token) = self.tokens.token() {
                match HeaderValue::from_str(&token) {
                    Ok(value) => {
                        request.headers_mut().insert(TOKEN_HEADER, value);
                    }
                    Err(_) => warn!("Stored token is not a valid header value, sending without it"),
                }
            }
        }

        debug!("{} {}", request.method(), request.url());
        Ok(request)
    }

    async fn on_request_error(&self, error: reqwest_middleware::Error) -> reqwest_middleware::Error {
        warn!("Request interceptor failed: {}", error);
        error
    }
}

/// Turns non-2xx responses into [`ApiError`]s and drops the token on 401.
pub struct ErrorInterceptor {
    tokens: Arc<dyn TokenStore>,
}

impl ErrorInterceptor {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl ResponseInterceptor for ErrorInterceptor {
    async fn on_response(&self, response: Response) -> reqwest_middleware::Result<Response> {
        debug!("{} {}", response.status(), response.url());
        Ok(response)
    }

    async fn on_response_error(&self, rejection: Rejection) -> reqwest_middleware::Result<Response> {
        let response = match rejection {
            Rejection::Status(response) => response,
            Rejection::Transport(err) => {
                warn!("Request failed before a response arrived: {}", err);
                return Err(err);
            }
        };

        let status = response.status();
        let url = response.url().clone();
        let body: ErrorBody = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(e) => {
                debug!("Failed to read error body from {}: {}", url, e);
                ErrorBody::default()
            }
        };

        let code = body.code.unwrap_or_else(|| i64::from(status.as_u16()));
        if code == 401 {
            self.tokens.clear();
            info!("Cleared stored token after 401 from {}", url);
        }

        let message = resolve_error_message(
            code,
            body.msg.as_deref().or_else(|| status.canonical_reason()),
        );
        warn!("Request to {} rejected: [{}] {}", url, code, message);

        Err(reject(ApiError::new(code, message)))
    }
}
