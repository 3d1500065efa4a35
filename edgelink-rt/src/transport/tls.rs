//! TLS configuration value consumed by transports.
//!
//! The runtime itself embeds no TLS stack; this value describes what a
//! TLS-capable network stack should do. A transport handed a config it
//! cannot honor must fail at construction rather than fall back to
//! plaintext.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use tracing::warn;

// Layer 3: Internal module imports
// (none)

/// How the peer certificate is verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationMode {
    /// No certificate verification. Insecure; for tests only.
    None,
    /// Verify the chain but skip hostname matching. Insecure.
    NoHostname,
    /// Full chain and hostname verification.
    Full,
}

/// Supported protocol versions, ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TlsVersion {
    /// TLS 1.2
    V1_2,
    /// TLS 1.3
    V1_3,
}

/// TLS settings for a transport connection.
///
/// mTLS is enabled by supplying both a client certificate chain and a
/// private key. Insecure verification modes must be chosen explicitly
/// and are logged as warnings during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// PEM-encoded certificate chain presented to the peer
    pub certificate_chain_pem: Option<String>,

    /// PEM-encoded private key for the presented chain
    pub private_key_pem: Option<String>,

    /// PEM-encoded trust roots; system roots when absent
    pub trust_roots_pem: Option<String>,

    /// Peer verification mode
    pub verification: VerificationMode,

    /// Minimum accepted protocol version
    pub min_version: TlsVersion,

    /// Maximum accepted protocol version
    pub max_version: TlsVersion,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            certificate_chain_pem: None,
            private_key_pem: None,
            trust_roots_pem: None,
            verification: VerificationMode::Full,
            min_version: TlsVersion::V1_2,
            max_version: TlsVersion::V1_3,
        }
    }
}

impl TlsConfig {
    /// A config with full verification and default versions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the presented certificate chain.
    pub fn with_certificate_chain(mut self, pem: impl Into<String>) -> Self {
        self.certificate_chain_pem = Some(pem.into());
        self
    }

    /// Set the private key for the presented chain.
    pub fn with_private_key(mut self, pem: impl Into<String>) -> Self {
        self.private_key_pem = Some(pem.into());
        self
    }

    /// Set explicit trust roots.
    pub fn with_trust_roots(mut self, pem: impl Into<String>) -> Self {
        self.trust_roots_pem = Some(pem.into());
        self
    }

    /// Set the verification mode.
    pub fn with_verification(mut self, mode: VerificationMode) -> Self {
        self.verification = mode;
        self
    }

    /// Set the accepted protocol version range.
    pub fn with_versions(mut self, min: TlsVersion, max: TlsVersion) -> Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    /// Whether client certificate authentication is configured.
    pub fn is_mutual(&self) -> bool {
        self.certificate_chain_pem.is_some() && self.private_key_pem.is_some()
    }

    /// Whether verification is weaker than full.
    pub fn is_insecure(&self) -> bool {
        self.verification != VerificationMode::Full
    }

    /// Validate the configuration, warning on insecure modes.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_version > self.max_version {
            return Err("min_version must not exceed max_version".to_string());
        }
        if self.certificate_chain_pem.is_some() != self.private_key_pem.is_some() {
            return Err(
                "client certificate chain and private key must be supplied together".to_string(),
            );
        }
        if self.is_insecure() {
            warn!(
                mode = ?self.verification,
                "TLS peer verification is weakened; this must be intentional"
            );
        }
        Ok(())
    }
}
