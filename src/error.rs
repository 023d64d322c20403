use thiserror::Error;

/// Rejection carried back to callers when the server (or the envelope it
/// returned) reports a failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
}

impl ApiError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("Interceptor error: {0}")]
    Middleware(anyhow::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Relative path {0} requires a base URL")]
    MissingBaseUrl(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Default client not initialized")]
    NotInitialized,
}

impl HttpError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, HttpError::Transport(e) if e.is_timeout())
    }
}

impl From<reqwest_middleware::Error> for HttpError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => HttpError::Transport(e),
            reqwest_middleware::Error::Middleware(e) => match e.downcast::<ApiError>() {
                Ok(api) => HttpError::Api(api),
                Err(e) => HttpError::Middleware(e),
            },
        }
    }
}

/// Wraps an [`ApiError`] so it can travel through the middleware chain.
pub(crate) fn reject(api: ApiError) -> reqwest_middleware::Error {
    reqwest_middleware::Error::Middleware(anyhow::Error::new(api))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::new(403, "Permission denied");
        assert_eq!(err.to_string(), "[403] Permission denied");
    }

    #[test]
    fn test_api_error_survives_middleware_roundtrip() {
        let err: HttpError = reject(ApiError::new(401, "Login has expired")).into();

        match err {
            HttpError::Api(api) => {
                assert_eq!(api.code, 401);
                assert_eq!(api.message, "Login has expired");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_middleware_error_is_kept() {
        let inner = reqwest_middleware::Error::Middleware(anyhow::anyhow!("token store offline"));
        let err: HttpError = inner.into();

        assert!(matches!(err, HttpError::Middleware(_)));
        assert!(err.to_string().contains("token store offline"));
        assert!(!err.is_timeout());
    }
}
