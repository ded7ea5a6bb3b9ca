//! OCSP revocation checking for storefront certificates
//!
//! This crate asks a certificate's OCSP responder whether it has been revoked:
//! it builds the request from the certificate and its issuer, finds the
//! responder in the Authority Information Access extension, sends the request
//! through an [`OcspTransport`], and validates the signed answer.
//!
//! # Example
//!
//! ```no_run
//! use storefront_ocsp::{check_revocation, HttpOcspTransport};
//! use x509_cert::Certificate;
//!
//! # async fn example(leaf: Certificate, issuer: Certificate) -> Result<(), storefront_ocsp::Error> {
//! let transport = HttpOcspTransport::new()?;
//! check_revocation(&transport, &leaf, &issuer, chrono::Utc::now()).await?;
//! # Ok(())
//! # }
//! ```

pub mod asn1;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;

pub use asn1::{CertId, OcspRequest, OcspResponse, OcspResponseStatus};
pub use error::{Error, Result};
pub use request::{build_request, responder_url};
pub use response::{verify_response, CertStatus};
pub use transport::{HttpOcspTransport, OcspTransport, DEFAULT_TIMEOUT};

use chrono::{DateTime, Utc};
use x509_cert::Certificate;

/// Check that `cert` is not revoked
///
/// Fails unless the responder named by `cert` returns a valid response
/// reporting the certificate as good.
pub async fn check_revocation(
    transport: &dyn OcspTransport,
    cert: &Certificate,
    issuer: &Certificate,
    now: DateTime<Utc>,
) -> Result<()> {
    let url = responder_url(cert)?;
    let request = build_request(cert, issuer)?;

    let response = transport.query(&request, &url).await?;

    match verify_response(&response, cert, issuer, now)? {
        CertStatus::Good => {
            tracing::debug!("OCSP status good for serial {}", cert.tbs_certificate.serial_number);
            Ok(())
        }
        status => {
            tracing::warn!(
                "OCSP status {} for serial {}",
                status,
                cert.tbs_certificate.serial_number
            );
            Err(Error::Status(status))
        }
    }
}
