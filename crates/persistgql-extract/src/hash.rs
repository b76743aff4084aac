//! Hashing mode for query identifiers.

use sha2::{Digest, Sha256, Sha512};

/// Digest algorithm for hashed query identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashingAlgorithm {
    /// 256-bit digest, 64 hex characters.
    Sha256,
    /// 512-bit digest, 128 hex characters. The default.
    #[default]
    Sha512,
}

impl HashingAlgorithm {
    /// Resolve a configured algorithm name.
    ///
    /// Anything other than `"sha256"` or `"sha512"` falls back to sha512 so a
    /// config typo cannot fail a build; the fallback is logged.
    pub fn from_name(name: &str) -> Self {
        match name {
            "sha256" => HashingAlgorithm::Sha256,
            "sha512" => HashingAlgorithm::Sha512,
            other => {
                tracing::warn!(
                    algorithm = other,
                    "unrecognized hashing algorithm, falling back to sha512"
                );
                HashingAlgorithm::Sha512
            }
        }
    }

    /// Lowercase hex digest of `input` under this algorithm.
    pub fn digest_hex(&self, input: &str) -> String {
        match self {
            HashingAlgorithm::Sha256 => format!("{:x}", Sha256::digest(input.as_bytes())),
            HashingAlgorithm::Sha512 => format!("{:x}", Sha512::digest(input.as_bytes())),
        }
    }
}

/// How identifiers are assigned to deduplicated operation texts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Sequential integers starting at 1, in order of first appearance.
    #[default]
    Sequential,
    /// Hex digest of the operation text.
    Hashed(HashingAlgorithm),
}
