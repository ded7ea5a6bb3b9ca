//! Sending OCSP requests to a responder

use crate::error::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Default time allowed for one OCSP round trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Carries one DER-encoded OCSP request to a responder and returns the raw response
///
/// Implementations perform a single attempt; callers treat any error as a
/// failed revocation check. Dropping the returned future abandons the request.
pub trait OcspTransport: Send + Sync {
    fn query<'a>(
        &'a self,
        request: &'a [u8],
        responder_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>>;
}

/// OCSP transport over HTTP POST (RFC 6960 Appendix A.1)
#[derive(Debug, Clone)]
pub struct HttpOcspTransport {
    client: reqwest::Client,
}

impl HttpOcspTransport {
    /// Create a transport with the default 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Use an existing client (its timeout settings apply)
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl OcspTransport for HttpOcspTransport {
    fn query<'a>(
        &'a self,
        request: &'a [u8],
        responder_url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'a>> {
        Box::pin(async move {
            tracing::debug!("Sending OCSP request to {}", responder_url);

            let response = self
                .client
                .post(responder_url)
                .header("Content-Type", "application/ocsp-request")
                .header("Accept", "application/ocsp-response")
                .body(request.to_vec())
                .send()
                .await
                .map_err(|e| Error::Http(e.to_string()))?;

            if !response.status().is_success() {
                return Err(Error::Http(format!(
                    "OCSP responder returned status {}",
                    response.status()
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| Error::Http(e.to_string()))?;

            Ok(bytes.to_vec())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_responder_url_is_an_error() {
        let transport = HttpOcspTransport::new().unwrap();
        // Rejected while building the request, before any connection is made
        let result = transport.query(&[0x30, 0x00], "not a url").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn test_unreachable_responder_is_an_error() {
        let transport = HttpOcspTransport::with_timeout(Duration::from_secs(2)).unwrap();
        let result = transport.query(&[0x30, 0x00], "http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(Error::Http(_))));
    }
}
