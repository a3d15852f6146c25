//! QR code storage encoding.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How QR codes are written to and compared against stored records.
///
/// The same encoding must be used for writes and lookups; switching it on a
/// populated store makes existing records unmatchable.
///
/// With [`QrCodeEncoding::Sha256`] the redemption listing returns digests, so
/// a client cannot feed a listed code back into validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QrCodeEncoding {
    /// Lower-case hex SHA-256 digest of the raw code
    Sha256,
    /// Raw code, unchanged
    #[default]
    Plain,
}

impl QrCodeEncoding {
    /// Encodes a raw QR code for storage or lookup.
    #[must_use]
    pub fn encode(self, raw: &str) -> String {
        match self {
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(raw.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            Self::Plain => raw.to_string(),
        }
    }

    /// Configuration name of the encoding.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for QrCodeEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown encoding name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown QR code encoding `{0}` (expected `sha256` or `plain`)")]
pub struct UnknownEncoding(pub String);

impl FromStr for QrCodeEncoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "plain" => Ok(Self::Plain),
            other => Err(UnknownEncoding(other.to_string())),
        }
    }
}
