//! Cache key validation and namespacing.
//!
//! Every logical key is namespaced with an installation-specific prefix so
//! multiple sites can share one cache backend without colliding.

use sha2::{Digest, Sha256};

use crate::error::CacheError;

/// Separator that logical keys must carry at least once, e.g. `site:nav`.
pub const KEY_SEPARATOR: char = ':';

/// Minimum accepted logical key length.
pub const MIN_KEY_LEN: usize = 3;

/// Maximum accepted logical key length.
pub const MAX_KEY_LEN: usize = 64;

// Application namespace prepended before the site identifier.
const APP_PREFIX: &str = "memotag";

// Digest bytes kept for content-derived keys; 12 bytes hex-encode to 24
// characters, comfortably inside MAX_KEY_LEN with the `hash:` namespace.
const FRAGMENT_KEY_BYTES: usize = 12;

/// Validate a logical cache key.
///
/// Valid keys are non-empty, contain at least one [`KEY_SEPARATOR`] and have a
/// length within `[MIN_KEY_LEN, MAX_KEY_LEN]`.
pub fn validate(key: &str) -> Result<(), CacheError> {
    if key.len() < MIN_KEY_LEN {
        return Err(CacheError::invalid_key(key, "shorter than 3 characters"));
    }

    if key.len() > MAX_KEY_LEN {
        return Err(CacheError::invalid_key(key, "longer than 64 characters"));
    }

    if !key.contains(KEY_SEPARATOR) {
        return Err(CacheError::invalid_key(key, "missing namespace separator"));
    }

    Ok(())
}

/// Default key for a fragment that carries no explicit name: a short content
/// hash under the `hash:` namespace. Always passes [`validate`].
pub fn fragment_key(fragment: &str) -> String {
    let digest = Sha256::digest(fragment.as_bytes());
    format!("hash:{}", hex::encode(&digest[..FRAGMENT_KEY_BYTES]))
}

/// Installation-specific key namespace.
///
/// Computed once from the site URL and reused for every backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl KeySpace {
    /// Build the namespace for one installation.
    pub fn new(site_url: &str) -> Self {
        Self {
            prefix: format!("{APP_PREFIX}:{site_url}:"),
        }
    }

    /// The raw prefix, including the trailing separator.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prepend the namespace to a logical key.
    pub fn namespaced(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Recover the logical key from a namespaced one, if it belongs to this
    /// installation.
    pub fn strip<'a>(&self, namespaced: &'a str) -> Option<&'a str> {
        namespaced.strip_prefix(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_namespaced_keys_in_bounds() {
        assert!(validate("site:nav").is_ok());
        assert!(validate("a:b").is_ok());
        assert!(validate(&format!("ns:{}", "x".repeat(61))).is_ok());
    }

    #[test]
    fn rejects_short_keys() {
        assert!(matches!(
            validate(""),
            Err(CacheError::InvalidKey { .. })
        ));
        assert!(validate(":a").is_err());
    }

    #[test]
    fn rejects_long_keys() {
        let key = format!("ns:{}", "x".repeat(62));
        assert_eq!(key.len(), 65);
        assert!(validate(&key).is_err());
    }

    #[test]
    fn rejects_keys_without_separator() {
        assert!(validate("sitenav").is_err());
    }

    #[test]
    fn fragment_key_is_stable_and_valid() {
        let key = fragment_key("<ul></ul>");
        assert_eq!(key, fragment_key("<ul></ul>"));
        assert_ne!(key, fragment_key("<ol></ol>"));
        assert!(validate(&key).is_ok());
        assert!(key.starts_with("hash:"));
    }

    #[test]
    fn keyspace_roundtrip() {
        let space = KeySpace::new("example.com");
        let namespaced = space.namespaced("site:nav");
        assert_eq!(namespaced, "memotag:example.com:site:nav");
        assert_eq!(space.strip(&namespaced), Some("site:nav"));
        assert_eq!(space.strip("memotag:other.com:site:nav"), None);
    }
}
