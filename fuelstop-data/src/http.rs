//! Blocking bridge over the async `reqwest` client.
//!
//! The collaborator traits in `fuelstop-core` are synchronous so the planner
//! can run anywhere. Each HTTP adapter owns a [`BlockingClient`], which keeps
//! a `current_thread` Tokio runtime alive for its whole lifetime and drives
//! request futures to completion on it.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use fuelstop_core::{GeocodeError, RouteProviderError};
use reqwest::Client;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

/// Default user agent sent with every request.
///
/// Nominatim's usage policy rejects requests without an identifying agent.
pub const DEFAULT_USER_AGENT: &str = "fuelstop-engine/0.1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while constructing an HTTP adapter.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// An HTTP client paired with the runtime that drives it.
///
/// # Runtime behaviour
///
/// Outside any Tokio runtime the owned runtime is used. Inside a
/// multi-threaded runtime the caller's handle is used through
/// [`tokio::task::block_in_place`], because starting a second runtime there
/// would panic. Callers on a `current_thread` runtime must move the call onto
/// a blocking thread first.
pub(crate) struct BlockingClient {
    client: Client,
    runtime: Runtime,
    timeout: Duration,
}

impl fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingClient")
            .field("client", &self.client)
            .field("timeout", &self.timeout)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl BlockingClient {
    pub(crate) fn new(user_agent: &str, timeout: Duration) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            runtime,
            timeout,
        })
    }

    pub(crate) const fn client(&self) -> &Client {
        &self.client
    }

    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }

    /// Classify a transport failure for `url`.
    pub(crate) fn classify(&self, error: &reqwest::Error, url: &str) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return TransportError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        TransportError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Transport-level failure shared by every adapter before it is mapped onto
/// the collaborator's own error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TransportError {
    Timeout {
        url: String,
        timeout_secs: u64,
    },
    Http {
        url: String,
        status: u16,
        message: String,
    },
    Network {
        url: String,
        message: String,
    },
}

impl From<TransportError> for GeocodeError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout { url, timeout_secs } => Self::Timeout { url, timeout_secs },
            TransportError::Http {
                url,
                status,
                message,
            } => Self::Http {
                url,
                status,
                message,
            },
            TransportError::Network { url, message } => Self::Network { url, message },
        }
    }
}

impl From<TransportError> for RouteProviderError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Timeout { url, timeout_secs } => Self::Timeout { url, timeout_secs },
            TransportError::Http {
                url,
                status,
                message,
            } => Self::Http {
                url,
                status,
                message,
            },
            TransportError::Network { url, message } => Self::Network { url, message },
        }
    }
}

/// Join a base URL and a path without doubling the separator.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
