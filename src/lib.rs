//! Preconfigured HTTP client for the admin API.
//!
//! [`create_client`] merges caller options over a 12 second default timeout
//! and registers one request and one response interceptor pair. The default
//! client is installed explicitly at startup with [`init_default_client`].

pub mod config;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod interceptors;
pub mod options;

pub use config::HttpConfig;
pub use error::{ApiError, HttpError};
pub use http_client::{
    create_client, create_client_with, default_client, init_default_client, HttpClient,
};
pub use interceptors::{
    AuthInterceptor, ErrorInterceptor, Interceptors, MemoryTokenStore, Rejection,
    RequestInterceptor, ResponseInterceptor, TokenStore,
};
pub use options::{ClientOptions, DEFAULT_TIMEOUT};
