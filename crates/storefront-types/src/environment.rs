//! Server environments a payload can be issued from

use serde::{Deserialize, Serialize};

/// The storefront environment that produced (or is expected to produce) a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    /// Sandbox testing environment
    Sandbox,
    /// Live production environment
    Production,
    /// Local IDE tooling; payloads are not signed by the storefront
    Xcode,
    /// Local unit-testing environment; payloads are not signed by the storefront
    LocalTesting,
    /// Any value this crate does not know about
    ///
    /// Never equal to a configured environment during reconciliation, so a
    /// payload carrying one fails with an environment mismatch.
    #[serde(other)]
    Unknown,
}

impl Environment {
    /// Whether payloads from this environment carry no storefront signature.
    ///
    /// Verifiers configured for such an environment decode payloads structurally
    /// and skip chain, signature, and identity checks.
    pub fn skips_signature_verification(&self) -> bool {
        matches!(self, Environment::Xcode | Environment::LocalTesting)
    }

    /// The wire name of this environment
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "Sandbox",
            Environment::Production => "Production",
            Environment::Xcode => "Xcode",
            Environment::LocalTesting => "LocalTesting",
            Environment::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
