//! Content hashing.
//!
//! A [`ContentDigest`] is the SHA-256 of exactly one byte sequence, rendered as
//! 64 lowercase hex characters. It is the primary key of the processed-items
//! table and the input to response cache keys.

use crate::error::{NiobiumError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Hex length of a SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

const READ_CHUNK_SIZE: usize = 1 << 16;

/// Stable digest of a byte sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(String);

impl ContentDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContentDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentDigest {
    type Err = NiobiumError;

    fn from_str(s: &str) -> Result<Self> {
        let valid = s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !valid {
            return Err(NiobiumError::validation(format!(
                "Not a content digest (expected {} lowercase hex characters): {}",
                DIGEST_HEX_LEN, s
            )));
        }
        Ok(Self(s.to_string()))
    }
}

/// Digest an in-memory byte slice.
pub fn digest_bytes(data: &[u8]) -> ContentDigest {
    ContentDigest(hex::encode(Sha256::digest(data)))
}

/// Digest a string's UTF-8 bytes.
pub fn digest_str(data: &str) -> ContentDigest {
    digest_bytes(data.as_bytes())
}

/// Digest everything a reader yields, 64 KiB at a time.
pub fn digest_reader<R: Read>(mut reader: R) -> Result<ContentDigest> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(ContentDigest(hex::encode(hasher.finalize())))
}

/// Digest a file's contents without loading it whole.
pub fn digest_file(path: impl AsRef<Path>) -> Result<ContentDigest> {
    let file = File::open(path.as_ref())?;
    let digest = digest_reader(file)?;
    tracing::debug!("Digested {}: {}", path.as_ref().display(), digest);
    Ok(digest)
}
