//! Immutable filter table and connection matching.

use ahash::AHashMap;

use super::entry::AddressPattern;
use crate::address::Address;
use crate::rule::RuleSet;
use crate::Protocol;

/// A CIDR block, host bits cleared, and its rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CidrEntry {
    pub(crate) pattern: AddressPattern,
    pub(crate) rules: RuleSet,
}

/// Queryable blacklist built from one configuration snapshot.
///
/// Tables are never mutated once built; a configuration reload builds a new
/// one. Lookups take `&self`, never lock, and never allocate.
///
/// Lookup order, stopping at the first hit:
/// 1. Exact host match
/// 2. Any containing CIDR block
/// 3. Wildcard address
///
/// # Examples
/// ```
/// use connfilter::{parse_connection_filters, Address, Protocol};
///
/// let table = parse_connection_filters([("10.0.0.0/24", ["8080"])]);
/// let inside: Address = "10.0.0.5".parse().unwrap();
/// let outside: Address = "10.0.1.5".parse().unwrap();
///
/// assert!(table.is_blacklisted_connection(&inside, 8080, Protocol::Tcp));
/// assert!(!table.is_blacklisted_connection(&outside, 8080, Protocol::Tcp));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterTable {
    pub(crate) exact: AHashMap<Address, RuleSet>,
    pub(crate) cidrs: Vec<CidrEntry>,
    pub(crate) wildcard: Option<RuleSet>,
}

impl FilterTable {
    /// Create a table that blacklists nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether a connection to or from `address:port` is blacklisted.
    pub fn is_blacklisted_connection(&self, address: &Address, port: u16, protocol: Protocol) -> bool {
        if let Some(rules) = self.exact.get(address) {
            if rules.matches(port, protocol) {
                return true;
            }
        }

        let in_cidr = self
            .cidrs
            .iter()
            .any(|entry| entry.pattern.matches(address) && entry.rules.matches(port, protocol));
        if in_cidr {
            return true;
        }

        self.matches_wildcard(port, protocol)
    }

    /// Like [`is_blacklisted_connection`](Self::is_blacklisted_connection),
    /// taking the address as text.
    ///
    /// An unparsable address only reaches the wildcard-address rules.
    pub fn is_blacklisted_host(&self, host: &str, port: u16, protocol: Protocol) -> bool {
        match Address::try_parse(host) {
            Some(address) => self.is_blacklisted_connection(&address, port, protocol),
            None => self.matches_wildcard(port, protocol),
        }
    }

    #[inline]
    fn matches_wildcard(&self, port: u16, protocol: Protocol) -> bool {
        self.wildcard
            .as_ref()
            .map_or(false, |rules| rules.matches(port, protocol))
    }

    /// Rules configured for an exact host.
    pub fn exact_rules(&self, address: &Address) -> Option<&RuleSet> {
        self.exact.get(address)
    }

    /// Rules configured for the wildcard address.
    pub fn wildcard_rules(&self) -> Option<&RuleSet> {
        self.wildcard.as_ref()
    }

    /// Number of exact-host entries.
    pub fn exact_count(&self) -> usize {
        self.exact.len()
    }

    /// Number of CIDR entries.
    pub fn cidr_count(&self) -> usize {
        self.cidrs.len()
    }

    /// Whether a wildcard-address entry exists.
    pub fn has_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.exact_count() + self.cidr_count() + usize::from(self.has_wildcard())
    }

    /// Check if the table blacklists nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_connection_filters;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    #[test]
    fn test_exact_match() {
        let table = parse_connection_filters([("172.0.0.1", ["80", "10", "443"])]);
        assert!(table.is_blacklisted_connection(&addr("172.0.0.1"), 10, Protocol::Tcp));
        assert!(table.is_blacklisted_connection(&addr("172.0.0.1"), 443, Protocol::Udp));
        assert!(!table.is_blacklisted_connection(&addr("172.0.0.1"), 11, Protocol::Tcp));
        assert!(!table.is_blacklisted_connection(&addr("172.0.0.2"), 10, Protocol::Tcp));
    }

    #[test]
    fn test_exact_miss_falls_through_to_cidr() {
        let table = parse_connection_filters([
            ("10.0.0.5", vec!["22"]),
            ("10.0.0.0/24", vec!["8080"]),
        ]);
        assert!(table.is_blacklisted_connection(&addr("10.0.0.5"), 22, Protocol::Tcp));
        assert!(table.is_blacklisted_connection(&addr("10.0.0.5"), 8080, Protocol::Tcp));
        assert!(!table.is_blacklisted_connection(&addr("10.0.0.6"), 22, Protocol::Tcp));
    }

    #[test]
    fn test_cidr_and_wildcard_paths() {
        let table = parse_connection_filters([
            ("2001:db8::2:1/55", vec!["80"]),
            ("*", vec!["9000"]),
        ]);
        assert!(table.is_blacklisted_connection(&addr("2001:db8::5:1"), 80, Protocol::Tcp));
        assert!(!table.is_blacklisted_connection(&addr("10.0.0.1"), 80, Protocol::Tcp));
        assert!(table.is_blacklisted_connection(&addr("10.0.1.24"), 9000, Protocol::Tcp));
        assert!(table.is_blacklisted_connection(&Address::Wildcard, 9000, Protocol::Udp));
        assert!(!table.is_blacklisted_connection(&Address::Wildcard, 80, Protocol::Tcp));
    }

    #[test]
    fn test_cidr_entries_hold_network_patterns() {
        let table = parse_connection_filters([("10.0.0.3/24", ["80"])]);
        assert_eq!(
            table.cidrs[0].pattern,
            AddressPattern::Cidr {
                prefix: addr("10.0.0.0"),
                prefix_len: 24
            }
        );

        assert!(table.is_blacklisted_connection(&addr("10.0.0.200"), 80, Protocol::Tcp));
        assert!(!table.is_blacklisted_connection(&addr("::ffff:10.0.0.200"), 80, Protocol::Tcp));
        assert!(!table.is_blacklisted_connection(&Address::Wildcard, 80, Protocol::Tcp));
    }

    #[test]
    fn test_unparsable_host() {
        let table = parse_connection_filters([("*", vec!["9000"]), ("10.0.0.0/8", vec!["1234"])]);
        assert!(table.is_blacklisted_host("not-an-ip", 9000, Protocol::Tcp));
        assert!(table.is_blacklisted_host("", 9000, Protocol::Tcp));
        assert!(!table.is_blacklisted_host("", 1234, Protocol::Tcp));
        assert!(!table.is_blacklisted_host("10.0.0.3/24", 1234, Protocol::Tcp));
        assert!(table.is_blacklisted_host("10.0.0.3", 1234, Protocol::Tcp));
    }

    #[test]
    fn test_empty_table() {
        let table = FilterTable::empty();
        assert!(table.is_empty());
        assert!(!table.is_blacklisted_connection(&addr("10.0.0.1"), 80, Protocol::Tcp));
        assert!(!table.is_blacklisted_host("*", 80, Protocol::Tcp));
    }

    #[test]
    fn test_counts() {
        let table = parse_connection_filters([
            ("10.0.0.1", vec!["1"]),
            ("10.0.0.2", vec!["2"]),
            ("10.0.0.0/8", vec!["3"]),
            ("*", vec!["4"]),
        ]);
        assert_eq!(table.exact_count(), 2);
        assert_eq!(table.cidr_count(), 1);
        assert!(table.has_wildcard());
        assert_eq!(table.len(), 4);
    }
}
