//! Cache item: one stored fragment rendering.
//!
//! Items are immutable once stored and replaced wholesale on re-store. The
//! wire representation is always the structured JSON form, never a bare
//! string payload.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// A rendered fragment together with the variable diff captured while
/// rendering it.
///
/// `variables` holds only entries that were introduced or changed during
/// fragment execution, never the full ambient state. `lastmod: None` marks a
/// persisted item that opted out of staleness tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheItem {
    /// Logical (un-namespaced) cache key.
    pub key: String,
    /// Fully-rendered output of the fragment that produced this item.
    pub markup: String,
    /// Variable diff to replay on a hit.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
    /// Site modification counter at store time; `None` = persist forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastmod: Option<u64>,
    /// Expiration in seconds; 0 = backend default / no expiry.
    #[serde(default)]
    pub expires: u32,
}

impl CacheItem {
    pub fn new(key: impl Into<String>, markup: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            markup: markup.into(),
            variables: BTreeMap::new(),
            lastmod: None,
            expires: 0,
        }
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_lastmod(mut self, lastmod: u64) -> Self {
        self.lastmod = Some(lastmod);
        self
    }

    pub fn with_expires(mut self, seconds: u32) -> Self {
        self.expires = seconds;
        self
    }

    /// A stored item is stale once the site has been modified after it was
    /// stored. Items without a `lastmod` never go stale.
    pub fn is_stale(&self, current_lastmod: u64) -> bool {
        matches!(self.lastmod, Some(stored) if stored < current_lastmod)
    }

    /// Serialize to the wire representation.
    pub fn encode(&self) -> Result<Bytes, CacheError> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    /// Deserialize from the wire representation.
    pub fn decode(payload: &[u8]) -> Result<Self, CacheError> {
        Ok(serde_json::from_slice(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staleness_against_site_lastmod() {
        let item = CacheItem::new("site:nav", "<ul></ul>").with_lastmod(100);

        assert!(!item.is_stale(99));
        assert!(!item.is_stale(100));
        assert!(item.is_stale(101));
    }

    #[test]
    fn persisted_item_never_goes_stale() {
        let item = CacheItem::new("site:nav", "<ul></ul>");

        assert!(item.lastmod.is_none());
        assert!(!item.is_stale(u64::MAX));
    }

    #[test]
    fn encode_decode_preserves_fields() {
        let item = CacheItem::new("site:nav", "<ul></ul>")
            .with_variables(BTreeMap::from([("color".to_string(), "red".to_string())]))
            .with_lastmod(42)
            .with_expires(3600);

        let decoded = CacheItem::decode(&item.encode().expect("encode")).expect("decode");
        assert_eq!(decoded, item);
    }

    #[test]
    fn empty_diff_and_lastmod_are_omitted_on_the_wire() {
        let payload = CacheItem::new("site:nav", "x").encode().expect("encode");
        let text = std::str::from_utf8(&payload).expect("utf8");

        assert!(!text.contains("variables"));
        assert!(!text.contains("lastmod"));
    }

    #[test]
    fn garbage_payload_fails_to_decode() {
        assert!(matches!(
            CacheItem::decode(b"not json"),
            Err(CacheError::Codec(_))
        ));
    }
}
