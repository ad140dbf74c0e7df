//! memotag — memoized template fragments in a shared key-value cache.
//!
//! A CMS template-engine plugin core: given a cache key, either return a
//! previously stored rendering (replaying any variables captured alongside
//! it) or execute the enclosed fragment, capture newly-set variables, store
//! the result and return it.
//!
//! - **[`key`]**: installation-specific key namespacing and validation
//! - **[`item`]**: the stored cache item (markup, variable diff, lastmod)
//! - **[`vars`]**: explicit ambient variable state with snapshot/diff/merge
//! - **[`backend`]**: the injected key-value capability and an in-process
//!   implementation
//! - **[`store`]**: namespaced store with the staleness gate
//! - **[`tag`]**: the cache-or-compute orchestrator behind the template tag
//!
//! ## Usage
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use memotag::{CachingTag, FragmentStore, KeySpace, MemoryBackend, TagAttrs, Variables};
//! # use memotag::{HostPrefs, Renderer};
//! # async fn example(renderer: Arc<dyn Renderer>, prefs: Arc<dyn HostPrefs>) {
//! let store = FragmentStore::new(Arc::new(MemoryBackend::new()), KeySpace::new(&prefs.site_url()));
//! let tag = CachingTag::new(store, renderer, prefs);
//!
//! let mut vars = Variables::new();
//! let attrs = TagAttrs::named("site:nav").with_expires(3600);
//! let markup = tag.render(&attrs, Some("<nav/>"), &mut vars).await;
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod item;
pub mod key;
pub mod store;
pub mod tag;
pub mod vars;

pub use backend::{CacheBackend, MemoryBackend};
pub use config::ServerConfig;
pub use error::{CacheError, RenderError};
pub use item::CacheItem;
pub use key::{KeySpace, fragment_key};
pub use store::{FragmentStore, Lookup};
pub use tag::{CachingTag, HostPrefs, Renderer, TagAttrs};
pub use vars::Variables;
