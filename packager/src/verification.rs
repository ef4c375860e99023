//! Digest verification for downloaded release assets.
//!
//! Release assets carry a digest of the form `<algorithm>:<hex>`. Bytes are
//! only trusted once they hash to that value under the named algorithm;
//! there is no policy that skips the check.

use crate::release::Asset;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors arising from digest verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// The asset carries no digest to verify against.
    #[error("asset {asset} has no digest")]
    MissingDigest {
        /// Name of the asset.
        asset: String,
    },

    /// The digest is not of the form `<algorithm>:<hex>`.
    #[error("malformed digest \"{value}\"; expected <algorithm>:<hex>")]
    MalformedDigest {
        /// The rejected digest string.
        value: String,
    },

    /// The digest names an algorithm this build does not implement.
    #[error("unsupported digest algorithm \"{algorithm}\"")]
    UnsupportedAlgorithm {
        /// The rejected algorithm name.
        algorithm: String,
    },

    /// The bytes do not hash to the expected value.
    #[error("{algorithm} mismatch for {asset}: expected {expected}, got {actual}")]
    Mismatch {
        /// Name of the asset that failed verification.
        asset: String,
        /// Algorithm used for both digests.
        algorithm: DigestAlgorithm,
        /// Hex digest recorded in the release.
        expected: String,
        /// Hex digest of the downloaded bytes.
        actual: String,
    },
}

/// Hash algorithms accepted in asset digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// SHA-256.
    Sha256,
    /// SHA-384.
    Sha384,
    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// Hash `data` and return the lowercase hex digest.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbc_wheels::verification::DigestAlgorithm;
    ///
    /// assert_eq!(
    ///     DigestAlgorithm::Sha256.hex_digest(b""),
    ///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    /// );
    /// ```
    #[must_use]
    pub fn hex_digest(self, data: &[u8]) -> String {
        match self {
            Self::Sha256 => format!("{:x}", Sha256::digest(data)),
            Self::Sha384 => format!("{:x}", Sha384::digest(data)),
            Self::Sha512 => format!("{:x}", Sha512::digest(data)),
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = IntegrityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(IntegrityError::UnsupportedAlgorithm {
                algorithm: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        })
    }
}

/// A parsed `<algorithm>:<hex>` digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDigest {
    algorithm: DigestAlgorithm,
    hex: String,
}

impl AssetDigest {
    /// Return the digest algorithm.
    #[must_use]
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    /// Return the expected hex value as recorded.
    #[must_use]
    pub fn hex(&self) -> &str {
        &self.hex
    }

    /// Check `data` against this digest, comparing hex case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::Mismatch`] when the digests differ.
    pub fn verify(&self, asset: &str, data: &[u8]) -> Result<(), IntegrityError> {
        let actual = self.algorithm.hex_digest(data);
        if actual.eq_ignore_ascii_case(&self.hex) {
            return Ok(());
        }
        Err(IntegrityError::Mismatch {
            asset: asset.to_owned(),
            algorithm: self.algorithm,
            expected: self.hex.clone(),
            actual,
        })
    }
}

impl FromStr for AssetDigest {
    type Err = IntegrityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || IntegrityError::MalformedDigest {
            value: value.to_owned(),
        };
        let (algorithm, hex) = value.split_once(':').ok_or_else(malformed)?;
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        Ok(Self {
            algorithm: algorithm.parse()?,
            hex: hex.to_owned(),
        })
    }
}

/// Verify `data` against the digest recorded on `asset`.
///
/// # Errors
///
/// Returns an [`IntegrityError`] if the asset has no digest, the digest is
/// malformed or names an unsupported algorithm, or the bytes do not match.
///
/// # Examples
///
/// ```
/// use dbc_wheels::release::Asset;
/// use dbc_wheels::verification::verify_asset;
///
/// let asset = Asset {
///     name: "empty".to_owned(),
///     download_url: "https://example.test/empty".to_owned(),
///     digest: Some(
///         "sha256:E3B0C44298FC1C149AFBF4C8996FB92427AE41E4649B934CA495991B7852B855".to_owned(),
///     ),
/// };
/// assert!(verify_asset(&asset, b"").is_ok());
/// assert!(verify_asset(&asset, b"x").is_err());
/// ```
pub fn verify_asset(asset: &Asset, data: &[u8]) -> Result<(), IntegrityError> {
    let digest: AssetDigest = asset
        .digest
        .as_deref()
        .ok_or_else(|| IntegrityError::MissingDigest {
            asset: asset.name.clone(),
        })?
        .parse()?;
    digest.verify(&asset.name, data)
}
