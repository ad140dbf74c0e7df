//! The caching tag: cache-or-compute orchestration.
//!
//! One invocation is a single linear pass: validate the key, look it up, and
//! on a fresh hit replay the stored variables and return the stored markup;
//! otherwise render the fragment, capture the variable diff, store the item
//! best-effort and return the fresh markup.
//!
//! Concurrent requests racing on a cold key will redundantly render and both
//! write; last write wins. The stored content is idempotent for the same
//! fragment, so no coordination happens at this layer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::RenderError;
use crate::item::CacheItem;
use crate::key;
use crate::store::{FragmentStore, Lookup};
use crate::vars::Variables;

const SOURCE: &str = "memotag::tag";

/// Template engine collaborator.
///
/// Executes a fragment against the ambient variable state, mutating it as a
/// side effect. Opaque to the cache layer; render failures are the one error
/// class that propagates out of the tag.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, fragment: &str, vars: &mut Variables) -> Result<String, RenderError>;
}

/// Host configuration collaborator.
///
/// Supplies the installation identifier used for key namespacing and the
/// site-wide content-modification counter the staleness gate compares
/// against.
pub trait HostPrefs: Send + Sync {
    /// Installation identifier, typically the site URL.
    fn site_url(&self) -> String;

    /// Global counter that increases whenever site content changes.
    fn lastmod(&self) -> u64;
}

/// Attributes of one tag invocation.
#[derive(Debug, Clone, Default)]
pub struct TagAttrs {
    /// Cache key; defaults to a content hash of the fragment when absent.
    pub name: Option<String>,
    /// TTL in seconds; 0 = backend default / no expiry.
    pub expires: u32,
    /// Opt out of staleness tracking ("persist forever").
    pub persist: bool,
}

impl TagAttrs {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_expires(mut self, seconds: u32) -> Self {
        self.expires = seconds;
        self
    }

    pub fn persisted(mut self) -> Self {
        self.persist = true;
        self
    }
}

/// The cache-or-compute orchestrator behind the template tag.
pub struct CachingTag {
    store: FragmentStore,
    renderer: Arc<dyn Renderer>,
    prefs: Arc<dyn HostPrefs>,
}

impl CachingTag {
    pub fn new(store: FragmentStore, renderer: Arc<dyn Renderer>, prefs: Arc<dyn HostPrefs>) -> Self {
        Self {
            store,
            renderer,
            prefs,
        }
    }

    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    /// Render a tag invocation.
    ///
    /// `fragment: None` is the container-less form: a pure fetch by name that
    /// returns empty markup on a miss. An invalid or missing key is reported
    /// and returns empty markup without touching the backend.
    pub async fn render(
        &self,
        attrs: &TagAttrs,
        fragment: Option<&str>,
        vars: &mut Variables,
    ) -> Result<String, RenderError> {
        let key = match (&attrs.name, fragment) {
            (Some(name), _) => name.clone(),
            (None, Some(fragment)) => key::fragment_key(fragment),
            (None, None) => {
                error!(target: SOURCE, "tag used without a fragment needs a name attribute");
                return Ok(String::new());
            }
        };

        if let Err(err) = key::validate(&key) {
            error!(target: SOURCE, error = %err, "invalid name attribute");
            return Ok(String::new());
        }

        let lastmod = self.prefs.lastmod();

        if let Lookup::Fresh(item) = self.store.lookup(&key, lastmod).await {
            if !item.variables.is_empty() {
                debug!(
                    target: SOURCE,
                    key = %key,
                    count = item.variables.len(),
                    "restoring variables from cache"
                );
                vars.merge(&item.variables);
            }
            return Ok(item.markup);
        }

        let Some(fragment) = fragment else {
            return Ok(String::new());
        };

        let before = vars.snapshot();
        let markup = self.renderer.render(fragment, vars).await?;
        let captured = vars.diff(&before);

        for name in captured.keys() {
            debug!(target: SOURCE, key = %key, variable = %name, "picked up variable for storage");
        }

        let mut item = CacheItem::new(key.clone(), markup.clone())
            .with_expires(attrs.expires)
            .with_variables(captured);

        if !attrs.persist {
            item = item.with_lastmod(lastmod);
        }

        match self.store.store(&item).await {
            Ok(()) => debug!(target: SOURCE, key = %key, "stored rendered fragment"),
            Err(err) => {
                warn!(target: SOURCE, key = %key, error = %err, "failed to store rendered fragment");
            }
        }

        Ok(markup)
    }
}
