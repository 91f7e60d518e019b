//! Model client implementations for Mythos.
//!
//! All clients implement the `mythos_core::Provider` trait.
//! The router picks the direct Gemini client or the reverse-proxy client
//! based on configuration.

pub mod gemini;
pub mod proxy;
pub mod router;

pub use gemini::GeminiProvider;
pub use proxy::ReverseProxyProvider;
pub use router::build_from_config;

use mythos_core::error::ProviderError;

/// Map a non-success HTTP status to the matching provider error.
pub(crate) fn status_error(status: u16, body: String, model: &str) -> ProviderError {
    match status {
        429 => ProviderError::RateLimited {
            retry_after_secs: 5,
        },
        401 | 403 => ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        404 => ProviderError::ModelNotFound(model.to_string()),
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

/// Map a transport failure.
pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Shared HTTP client with the request timeout applied.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
