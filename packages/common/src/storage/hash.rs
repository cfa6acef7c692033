use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};

use super::error::HashError;

/// Digest algorithm used to content-address uploaded payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    /// Length of the raw digest in bytes.
    pub fn digest_len(self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        }
    }

    fn from_hex_len(len: usize) -> Option<Self> {
        [Self::Sha256, Self::Sha384, Self::Sha512]
            .into_iter()
            .find(|alg| alg.digest_len() * 2 == len)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated content digest.
///
/// The algorithm is implied by the digest length, so the hex form alone is
/// enough to reconstruct the hash.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentHash {
    algorithm: DigestAlgorithm,
    digest: Vec<u8>,
}

impl ContentHash {
    /// Compute the digest of the given data.
    pub fn compute(algorithm: DigestAlgorithm, data: &[u8]) -> Self {
        let digest = match algorithm {
            DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        };
        Self { algorithm, digest }
    }

    /// Parse a hex-encoded digest, inferring the algorithm from its length.
    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let algorithm = DigestAlgorithm::from_hex_len(s.len()).ok_or_else(|| {
            HashError::Invalid(format!(
                "expected 64, 96 or 128 hex characters, got {}",
                s.len()
            ))
        })?;

        let digest = hex::decode(s).map_err(|e| HashError::Invalid(format!("invalid hex: {e}")))?;

        Ok(Self { algorithm, digest })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Return the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.digest)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.digest
    }

    /// Return the first 2 hex characters (shard prefix for filesystem layout).
    pub fn shard_prefix(&self) -> String {
        hex::encode(&self.digest[..1])
    }

    /// Return the remaining hex characters (directory name within the shard).
    pub fn shard_suffix(&self) -> String {
        hex::encode(&self.digest[1..])
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}:{})", self.algorithm, self.to_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Deterministic content-addressing function from payload bytes to a digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashEngine {
    algorithm: DigestAlgorithm,
}

impl HashEngine {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Digest a payload on the blocking pool.
    ///
    /// A digest task that panics or is cancelled surfaces as
    /// [`HashError::Compute`] instead of unwinding into the caller.
    pub async fn digest(&self, data: Bytes) -> Result<ContentHash, HashError> {
        let algorithm = self.algorithm;
        tokio::task::spawn_blocking(move || ContentHash::compute(algorithm, &data))
            .await
            .map_err(|e| HashError::Compute(e.to_string()))
    }
}
