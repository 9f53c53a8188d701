use sha2::{Digest as _, Sha256};
use votechain_types::Digest;

/// Domain-separated SHA-256 content hasher.
///
/// Each hasher carries a domain tag (e.g., `"votechain-block-v1"`) that is
/// prepended to every hash computation, so bytes hashed for one purpose can
/// never collide with bytes hashed for another.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for ledger blocks.
    pub const BLOCK: Self = Self {
        domain: "votechain-block-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Digest {
        let mut hasher = Sha256::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Digest::from_bytes(hasher.finalize().into())
    }

    /// Hash a serializable value as compact JSON with domain separation.
    pub fn hash_json<T: serde::Serialize>(&self, value: &T) -> Result<Digest, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(self.hash(&data))
    }
}

/// Errors from hashing operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use sha2::Digest as _;

    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = ContentHasher::BLOCK.hash(b"hello world");
        let b = ContentHasher::BLOCK.hash(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn hash_prefixes_domain_tag() {
        let tagged = Digest::from_bytes(Sha256::digest(b"votechain-block-v1:abc").into());
        let plain = Digest::from_bytes(Sha256::digest(b"abc").into());
        assert_eq!(ContentHasher::BLOCK.hash(b"abc"), tagged);
        assert_ne!(ContentHasher::BLOCK.hash(b"abc"), plain);
    }

    #[test]
    fn hash_json_matches_hash_of_encoding() {
        let value = serde_json::json!(["a", 1, true]);
        let digest = ContentHasher::BLOCK.hash_json(&value).unwrap();
        assert_eq!(digest, ContentHasher::BLOCK.hash(br#"["a",1,true]"#));
    }
}
