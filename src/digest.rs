//! Digest primitives and the target digest.
//!
//! The algorithms come from the RustCrypto crates; this module only selects
//! one, runs it, and validates target digests against it.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    Sha256,
    Sha384,
    Sha512,
    Pbkdf2,
}

impl Algorithm {
    /// Fixed digest length in bytes, `None` for PBKDF2 which derives any length.
    pub fn digest_len(self) -> Option<usize> {
        match self {
            Algorithm::Sha256 => Some(32),
            Algorithm::Sha384 => Some(48),
            Algorithm::Sha512 => Some(64),
            Algorithm::Pbkdf2 => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "SHA256",
            Algorithm::Sha384 => "SHA384",
            Algorithm::Sha512 => "SHA512",
            Algorithm::Pbkdf2 => "PBKDF2",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().replace('-', "").as_str() {
            "SHA256" => Ok(Algorithm::Sha256),
            "SHA384" => Ok(Algorithm::Sha384),
            "SHA512" => Ok(Algorithm::Sha512),
            "PBKDF2" => Ok(Algorithm::Pbkdf2),
            other => Err(PipelineError::Configuration(format!(
                "Unsupported hash algorithm '{other}'. Must be one of: SHA256, SHA384, SHA512, PBKDF2"
            ))),
        }
    }
}

/// The single digest every candidate is compared against.
///
/// Built once before the workers start and only ever shared by `&` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDigest {
    algorithm: Algorithm,
    bytes: Vec<u8>,
    hex: String,
    salt: Option<Vec<u8>>,
}

impl TargetDigest {
    /// Parse and validate a hex target for `algorithm`.
    ///
    /// SHA-2 targets must have the exact hex length of the algorithm (64, 96
    /// or 128 characters). PBKDF2 targets need an explicit salt and may have
    /// any non-zero length.
    pub fn parse(algorithm: Algorithm, target_hex: &str, salt_hex: Option<&str>) -> Result<Self> {
        let hex = target_hex.trim().to_ascii_lowercase();
        if hex.is_empty() {
            return Err(PipelineError::Configuration(
                "Target hash is empty".to_string(),
            ));
        }

        if let Some(expected) = algorithm.digest_len()
            && hex.len() != expected * 2
        {
            return Err(PipelineError::Configuration(format!(
                "Target hash for {algorithm} must be {} hex characters, got {}",
                expected * 2,
                hex.len()
            )));
        }

        let bytes = hex::decode(&hex).map_err(|e| {
            PipelineError::Configuration(format!("Target hash is not valid hex: {e}"))
        })?;

        let salt = match (algorithm, salt_hex) {
            (Algorithm::Pbkdf2, Some(salt)) => Some(decode_salt(salt)?),
            (Algorithm::Pbkdf2, None) => {
                return Err(PipelineError::Configuration(
                    "PBKDF2 targets require an explicit salt".to_string(),
                ));
            }
            (_, _) => None,
        };

        Ok(Self {
            algorithm,
            bytes,
            hex,
            salt,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex form of the target
    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn salt(&self) -> Option<&[u8]> {
        self.salt.as_deref()
    }

    /// Byte-for-byte comparison against a computed digest.
    pub fn matches(&self, computed: &[u8]) -> bool {
        self.bytes.as_slice() == computed
    }
}

pub(crate) fn decode_salt(salt_hex: &str) -> Result<Vec<u8>> {
    let salt = hex::decode(salt_hex.trim())
        .map_err(|e| PipelineError::Configuration(format!("PBKDF2 salt is not valid hex: {e}")))?;
    if salt.is_empty() {
        return Err(PipelineError::Configuration(
            "PBKDF2 salt must not be empty".to_string(),
        ));
    }
    Ok(salt)
}

/// Computes digests for one algorithm configuration.
///
/// Cheap to clone; every worker owns its own copy.
#[derive(Debug, Clone)]
pub struct Digester {
    algorithm: Algorithm,
    iterations: u32,
    salt: Vec<u8>,
    output_len: usize,
}

impl Digester {
    /// Build a digester producing digests comparable with `target`.
    pub fn for_target(target: &TargetDigest, iterations: u32) -> Result<Self> {
        Self::new(
            target.algorithm(),
            iterations,
            target.salt().map(<[u8]>::to_vec),
            target.bytes().len(),
        )
    }

    pub fn new(
        algorithm: Algorithm,
        iterations: u32,
        salt: Option<Vec<u8>>,
        output_len: usize,
    ) -> Result<Self> {
        if algorithm == Algorithm::Pbkdf2 {
            if iterations == 0 {
                return Err(PipelineError::Configuration(
                    "pbkdf2_iterations must be at least 1".to_string(),
                ));
            }
            if output_len == 0 {
                return Err(PipelineError::Configuration(
                    "PBKDF2 output length must be at least 1 byte".to_string(),
                ));
            }
        }

        let salt = match (algorithm, salt) {
            (Algorithm::Pbkdf2, Some(salt)) if !salt.is_empty() => salt,
            (Algorithm::Pbkdf2, _) => {
                return Err(PipelineError::Configuration(
                    "PBKDF2 requires a non-empty salt".to_string(),
                ));
            }
            (_, _) => Vec::new(),
        };

        Ok(Self {
            algorithm,
            iterations,
            salt,
            output_len: algorithm.digest_len().unwrap_or(output_len),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Digest raw bytes.
    pub fn digest(&self, input: &[u8]) -> Result<Vec<u8>> {
        let bytes = match self.algorithm {
            Algorithm::Sha256 => Sha256::digest(input).to_vec(),
            Algorithm::Sha384 => Sha384::digest(input).to_vec(),
            Algorithm::Sha512 => Sha512::digest(input).to_vec(),
            Algorithm::Pbkdf2 => {
                let mut out = vec![0u8; self.output_len];
                pbkdf2::pbkdf2_hmac::<Sha256>(input, &self.salt, self.iterations, &mut out);
                out
            }
        };

        if bytes.len() != self.output_len {
            return Err(PipelineError::Configuration(format!(
                "{} produced {} bytes, expected {}",
                self.algorithm,
                bytes.len(),
                self.output_len
            )));
        }
        Ok(bytes)
    }

    /// Digest raw bytes and return lowercase hex.
    pub fn digest_hex(&self, input: &[u8]) -> Result<String> {
        Ok(hex::encode(self.digest(input)?))
    }
}
