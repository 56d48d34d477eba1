//! Subresource integrity digests.
//!
//! An [`Integrity`] is the raw SHA-384 digest of a resource. Its `Display`
//! form is the attribute value browsers expect: `sha384-<base64>`, using the
//! standard base64 alphabet with padding.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha384};

/// Algorithm prefix of every integrity value we emit.
pub const ALGORITHM: &str = "sha384";

/// Digest length of SHA-384 in bytes.
pub const DIGEST_LEN: usize = 48;

/// A SHA-384 content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Integrity([u8; DIGEST_LEN]);

impl Integrity {
    /// Hash the given content.
    pub fn compute(content: impl AsRef<[u8]>) -> Self {
        let digest = Sha384::digest(content.as_ref());
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Get the raw digest bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Standard padded base64 of the digest, without the algorithm prefix.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }
}

impl fmt::Display for Integrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", ALGORITHM, self.to_base64())
    }
}
