//! Building filter tables from raw configuration.

use super::entry::{AddressPattern, FilterEntry};
use super::table::{CidrEntry, FilterTable};
use crate::error::FilterError;

/// Incremental builder for a [`FilterTable`].
///
/// Lines are independent: a rejected line leaves the builder untouched, and
/// repeated hosts or networks have their rules merged.
///
/// # Examples
/// ```
/// use connfilter::{FilterError, FilterTableBuilder, Protocol};
///
/// let mut builder = FilterTableBuilder::new();
/// builder.add_entry("10.0.0.1", ["tcp 22"]).unwrap();
/// assert_eq!(
///     builder.add_entry("*", ["*"]),
///     Err(FilterError::RejectedGlobalWildcard)
/// );
///
/// let table = builder.build();
/// assert!(table.is_blacklisted_host("10.0.0.1", 22, Protocol::Tcp));
/// ```
#[derive(Debug, Default)]
pub struct FilterTableBuilder {
    table: FilterTable,
}

impl FilterTableBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add one raw line.
    pub fn add_entry<I>(&mut self, pattern: &str, ports: I) -> Result<(), FilterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let entry = FilterEntry::parse(pattern, ports)?;
        log::trace!("Accepted connection filter {} {}", entry.pattern(), entry.rules());
        self.insert(entry);
        Ok(())
    }

    /// Add an already validated entry.
    pub fn insert(&mut self, entry: FilterEntry) {
        let (pattern, rules) = entry.into_parts();
        let table = &mut self.table;

        match pattern {
            AddressPattern::Exact(address) => {
                table.exact.entry(address).or_default().merge(rules);
            }
            AddressPattern::Cidr { prefix, prefix_len } => {
                let Some(network) = prefix.network(prefix_len) else {
                    return;
                };
                let pattern = AddressPattern::Cidr {
                    prefix: network,
                    prefix_len,
                };
                match table.cidrs.iter_mut().find(|entry| entry.pattern == pattern) {
                    Some(existing) => existing.rules.merge(rules),
                    None => table.cidrs.push(CidrEntry { pattern, rules }),
                }
            }
            AddressPattern::Wildcard => match table.wildcard.as_mut() {
                Some(existing) => existing.merge(rules),
                None => table.wildcard = Some(rules),
            },
        }
    }

    /// Number of entries accepted so far.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if no entry has been accepted.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Finish building.
    pub fn build(self) -> FilterTable {
        self.table
    }
}

/// Build a [`FilterTable`] from a raw address → port-patterns mapping.
///
/// This never fails. Invalid lines are logged and dropped without affecting
/// any other line.
pub fn parse_connection_filters<I, K, V>(raw: I) -> FilterTable
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: IntoIterator,
    V::Item: AsRef<str>,
{
    let mut builder = FilterTableBuilder::new();
    let mut rejected = 0usize;

    for (pattern, ports) in raw {
        let pattern = pattern.as_ref();
        if let Err(e) = builder.add_entry(pattern, ports) {
            log::warn!("Ignoring connection filter {:?}: {}", pattern, e);
            rejected += 1;
        }
    }

    let table = builder.build();
    log::debug!(
        "Built connection filter table: {} exact, {} CIDR, wildcard={}, {} rejected",
        table.exact_count(),
        table.cidr_count(),
        table.has_wildcard(),
        rejected
    );
    table
}
