use std::fmt;
use std::hash::{Hash, Hasher};

use sha1::{Digest, Sha1};

use crate::error::TypeError;

/// Content-addressed identifier for any stored value.
///
/// A `Key` is the SHA-1 digest of a value's canonical encoding. Identical
/// content always produces the same `Key`, making values deduplicatable and
/// verifiable. Keys order lexicographically on their raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key([u8; Key::WIDTH]);

impl Key {
    /// Digest width in bytes.
    pub const WIDTH: usize = 20;

    /// Compute a `Key` from raw bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let digest = Sha1::digest(data);
        Self(digest.into())
    }

    /// Create a `Key` from a pre-computed digest.
    pub const fn from_digest(digest: [u8; Key::WIDTH]) -> Self {
        Self(digest)
    }

    /// Digest of the concatenation of the given keys' raw bytes.
    pub fn concat(keys: &[Key]) -> Self {
        let mut hasher = Sha1::new();
        for key in keys {
            hasher.update(key.0);
        }
        Self(hasher.finalize().into())
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; Key::WIDTH] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters), for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != Key::WIDTH {
            return Err(TypeError::InvalidLength {
                expected: Key::WIDTH,
                actual: bytes.len(),
            });
        }
        let mut digest = [0u8; Key::WIDTH];
        digest.copy_from_slice(&bytes);
        Ok(Self(digest))
    }

    /// The first machine word of the digest, for hash-table bucketing.
    pub fn bucket(&self) -> u64 {
        u64::from_be_bytes(self.0[..8].try_into().expect("digest shorter than a word"))
    }
}

// Bucketing on the leading word is enough: equal keys share it, and the
// digest distributes uniformly.
impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.bucket());
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.short_hex())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; Key::WIDTH]> for Key {
    fn from(digest: [u8; Key::WIDTH]) -> Self {
        Self(digest)
    }
}

impl From<Key> for [u8; Key::WIDTH] {
    fn from(key: Key) -> Self {
        key.0
    }
}
