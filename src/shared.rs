//! Hot-reloadable connection filters.
//!
//! Readers load the current [`ConnectionFilters`] through an `ArcSwap` and
//! never block. A reload builds a complete new snapshot first and then
//! publishes it with a single pointer swap, so a reader sees either the old
//! or the new filters, never a mix.

use arc_swap::{ArcSwap, Guard};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::FilterConfig;
use crate::filter::{Connection, ConnectionFilters};

/// Connection filters that can be replaced while in use.
///
/// # Example
///
/// ```
/// use connfilter::{Connection, FilterConfig, Protocol, SharedFilters};
///
/// let shared = SharedFilters::new();
/// let conn = Connection::new(
///     "10.0.0.1:40000".parse().unwrap(),
///     "10.0.0.2:9000".parse().unwrap(),
///     Protocol::Tcp,
/// );
/// assert!(!shared.is_blacklisted(&conn));
///
/// let config = FilterConfig::from_yaml_str("dest_excludes:\n  \"*\": [9000]\n").unwrap();
/// shared.reload(&config);
/// assert!(shared.is_blacklisted(&conn));
/// ```
pub struct SharedFilters {
    /// Current snapshot, swapped atomically on reload.
    current: ArcSwap<ConnectionFilters>,
    /// Serializes writers; readers never touch it.
    reload_lock: Mutex<()>,
    /// Number of snapshots published after the initial one.
    generation: AtomicU64,
}

impl SharedFilters {
    /// Create a handle whose filters blacklist nothing.
    pub fn new() -> Self {
        Self::with_filters(ConnectionFilters::default())
    }

    /// Create a handle from already built filters.
    pub fn with_filters(filters: ConnectionFilters) -> Self {
        Self {
            current: ArcSwap::from_pointee(filters),
            reload_lock: Mutex::new(()),
            generation: AtomicU64::new(0),
        }
    }

    /// Create a handle from a configuration.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self::with_filters(ConnectionFilters::from_config(config))
    }

    /// Current snapshot.
    ///
    /// The guard keeps its snapshot alive even if a reload happens meanwhile.
    pub fn load(&self) -> Guard<Arc<ConnectionFilters>> {
        self.current.load()
    }

    /// Check a connection against the current snapshot.
    pub fn is_blacklisted(&self, conn: &Connection) -> bool {
        self.current.load().is_blacklisted(conn)
    }

    /// Rebuild the filters from `config` and publish them.
    pub fn reload(&self, config: &FilterConfig) {
        let filters = ConnectionFilters::from_config(config);
        self.replace(filters);
    }

    /// Publish prebuilt filters.
    pub fn replace(&self, filters: ConnectionFilters) {
        let _guard = self.reload_lock.lock();

        let (source, dest) = (filters.source().len(), filters.dest().len());
        self.current.store(Arc::new(filters));
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        log::info!(
            "Reloaded connection filters (generation {}): {} source, {} destination entries",
            generation,
            source,
            dest
        );
    }

    /// Number of reloads so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

impl Default for SharedFilters {
    fn default() -> Self {
        Self::new()
    }
}
