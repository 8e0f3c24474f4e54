//! Tunable parameters with enforced security floors.
//!
//! A `Config` can be built in code, taken from `Default`, or read from a
//! JSON document the host keeps next to its other settings. Every entry
//! point that accepts a `Config` validates it first; values below the
//! floors are rejected rather than clamped.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShareVaultError};

/// Lowest PBKDF2 iteration count accepted.
pub const MIN_KDF_ITERATIONS: u32 = 100_000;

/// Highest PBKDF2 iteration count accepted. The count is read back from
/// stored records, so it is bounded on both sides.
pub const MAX_KDF_ITERATIONS: u32 = 10_000_000;

/// RSA modulus sizes accepted for key generation.
pub const ALLOWED_RSA_BITS: [usize; 3] = [2048, 3072, 4096];

/// Default ceiling on payload size. Payloads are processed whole in memory.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 256 * 1024 * 1024;

/// Parameters shared by the key-pair service and the envelope cipher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// PBKDF2-HMAC-SHA256 iteration count used when wrapping private keys.
    pub kdf_iterations: u32,
    /// RSA modulus size for newly generated key pairs.
    pub rsa_bits: usize,
    /// Largest plaintext `EnvelopeCipher::encrypt` accepts.
    pub max_payload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kdf_iterations: MIN_KDF_ITERATIONS,
            rsa_bits: 2048,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl Config {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// default values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ShareVaultError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value against its bounds.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS).contains(&self.kdf_iterations) {
            return Err(ShareVaultError::InvalidConfig(format!(
                "kdfIterations must be between {MIN_KDF_ITERATIONS} and {MAX_KDF_ITERATIONS}"
            )));
        }
        if !ALLOWED_RSA_BITS.contains(&self.rsa_bits) {
            return Err(ShareVaultError::InvalidConfig(format!(
                "rsaBits must be one of {ALLOWED_RSA_BITS:?}"
            )));
        }
        if self.max_payload_bytes == 0 {
            return Err(ShareVaultError::InvalidConfig(
                "maxPayloadBytes must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{ "kdfIterations": 310000 }"#).unwrap();
        assert_eq!(config.kdf_iterations, 310_000);
        assert_eq!(config.rsa_bits, 2048);
        assert_eq!(config.max_payload_bytes, DEFAULT_MAX_PAYLOAD_BYTES);
    }

    #[test]
    fn test_floors_enforced() {
        assert!(Config::from_json_str(r#"{ "kdfIterations": 1000 }"#).is_err());
        assert!(Config::from_json_str(r#"{ "kdfIterations": 4294967295 }"#).is_err());
        assert!(Config::from_json_str(r#"{ "kdfIterations": 10000000 }"#).is_ok());
        assert!(Config::from_json_str(r#"{ "rsaBits": 1024 }"#).is_err());
        assert!(Config::from_json_str(r#"{ "maxPayloadBytes": 0 }"#).is_err());
        assert!(Config::from_json_str("not json").is_err());
    }
}
