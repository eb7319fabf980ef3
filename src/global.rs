//! Process-wide connection filters.

use arc_swap::Guard;
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Arc;

use crate::config::FilterConfig;
use crate::error::Result;
use crate::filter::{Connection, ConnectionFilters};
use crate::shared::SharedFilters;

/// Global filters; blacklist nothing until the first reload.
static GLOBAL_FILTERS: Lazy<SharedFilters> = Lazy::new(SharedFilters::new);

/// Rebuild the global filters from a configuration and publish them.
pub fn reload_filters(config: &FilterConfig) {
    GLOBAL_FILTERS.reload(config);
}

/// Load a configuration file and publish the resulting filters.
///
/// On error the current filters stay in place.
pub fn reload_filters_from_path(path: impl AsRef<Path>) -> Result<()> {
    let config = FilterConfig::load(path)?;
    reload_filters(&config);
    Ok(())
}

/// Check a connection against the global filters.
pub fn is_blacklisted(conn: &Connection) -> bool {
    GLOBAL_FILTERS.is_blacklisted(conn)
}

/// Current global snapshot.
pub fn current_filters() -> Guard<Arc<ConnectionFilters>> {
    GLOBAL_FILTERS.load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Protocol;

    // The only test touching the global instance, so it cannot race others.
    #[test]
    fn test_global_reload() {
        let conn = Connection::new(
            "10.0.0.1:22".parse().unwrap(),
            "10.0.0.2:443".parse().unwrap(),
            Protocol::Tcp,
        );
        assert!(!is_blacklisted(&conn));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.yaml");
        std::fs::write(&path, "source_excludes:\n  \"10.0.0.0/8\": [\"tcp 22\"]\n").unwrap();

        reload_filters_from_path(&path).unwrap();
        assert!(is_blacklisted(&conn));
        assert_eq!(current_filters().source().cidr_count(), 1);

        assert!(reload_filters_from_path(dir.path().join("missing.yaml")).is_err());
        assert!(is_blacklisted(&conn));

        reload_filters(&FilterConfig::default());
        assert!(!is_blacklisted(&conn));
    }
}
