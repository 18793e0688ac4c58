//! HTTP transport for talking to OAI-PMH repositories.
//!
//! The harvest client only needs "GET this URL with these query parameters
//! and give me the body", so that capability sits behind the [`Transport`]
//! trait. [`HttpTransport`] is the reqwest implementation; tests plug in
//! canned responses instead.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::config::{DEFAULT_MAX_RETRIES, HTTP_TIMEOUT_SECS};
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("oai-harvester/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Query parameters of a single request, in order.
pub type QueryParams = Vec<(&'static str, String)>;

/// Fetch a URL with query parameters and return the raw response body.
///
/// Implementations must treat any final status other than 200 as an error.
pub trait Transport {
    fn fetch(&self, url: &str, params: &[(&'static str, String)]) -> Result<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(&self, url: &str, params: &[(&'static str, String)]) -> Result<Vec<u8>> {
        (**self).fetch(url, params)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn fetch(&self, url: &str, params: &[(&'static str, String)]) -> Result<Vec<u8>> {
        (**self).fetch(url, params)
    }
}

/// Create a configured HTTP client.
///
/// # Returns
/// A `reqwest::blocking::Client` configured with appropriate timeout and user agent.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Blocking reqwest transport with retry on transient failures.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    max_retries: u32,
}

impl HttpTransport {
    /// Build a transport with the default client and retry budget.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(create_client()?))
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set the number of attempts per request (first try included, minimum 1).
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }
}

impl Transport for HttpTransport {
    /// Uses exponential backoff for transient failures (network errors, 5xx responses).
    fn fetch(&self, url: &str, params: &[(&'static str, String)]) -> Result<Vec<u8>> {
        let mut last_error: Option<String> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1000ms, 2000ms
                let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
                tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
                thread::sleep(Duration::from_millis(delay));
            }

            tracing::debug!(url, ?params, "GET");

            match self.client.get(url).query(params).send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            status = %status,
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }

                    // Anything but 200 is a hard failure
                    if status != StatusCode::OK {
                        return Err(HarvesterError::UnexpectedStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }

                    let bytes = response.bytes()?;
                    return Ok(bytes.to_vec());
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(
                            error = %e,
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            "Connection error, will retry"
                        );
                        last_error = Some(e.to_string());
                        continue;
                    }
                    return Err(HarvesterError::Http(e));
                }
            }
        }

        Err(HarvesterError::RetriesExhausted {
            attempts: self.max_retries,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_max_retries_floor() {
        let transport = HttpTransport::new().unwrap().with_max_retries(0);
        assert_eq!(transport.max_retries, 1);
    }
}
