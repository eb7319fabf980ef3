//! Validated filter lines.

use std::fmt;

use crate::address::{parse_cidr, Address};
use crate::error::FilterError;
use crate::rule::RuleSet;

/// Kind of address a filter line applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressPattern {
    /// A single host
    Exact(Address),
    /// Every host inside `prefix/prefix_len`
    Cidr { prefix: Address, prefix_len: u8 },
    /// Every host
    Wildcard,
}

impl AddressPattern {
    /// Parse an address-pattern key: a host, `host/prefix`, or `*`.
    ///
    /// A prefix spanning the whole family width is an exact host.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        let (address, prefix_len) = parse_cidr(s)?;
        Ok(if address.is_wildcard() {
            AddressPattern::Wildcard
        } else if prefix_len == address.family_width() {
            AddressPattern::Exact(address)
        } else {
            AddressPattern::Cidr {
                prefix: address,
                prefix_len,
            }
        })
    }

    /// Check whether `candidate` falls under this pattern.
    pub fn matches(&self, candidate: &Address) -> bool {
        match self {
            AddressPattern::Exact(address) => address == candidate,
            AddressPattern::Cidr { prefix, prefix_len } => prefix.contains(*prefix_len, candidate),
            AddressPattern::Wildcard => true,
        }
    }
}

impl fmt::Display for AddressPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressPattern::Exact(address) => write!(f, "{}", address),
            AddressPattern::Cidr { prefix, prefix_len } => write!(f, "{}/{}", prefix, prefix_len),
            AddressPattern::Wildcard => write!(f, "{}", Address::Wildcard),
        }
    }
}

/// One accepted configuration line: an address pattern and its rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pattern: AddressPattern,
    rules: RuleSet,
}

impl FilterEntry {
    /// Validate one raw `(address pattern, port patterns)` line.
    ///
    /// The line is rejected whole when the address or any port token is
    /// invalid, or when it would blacklist every connection.
    pub fn parse<I>(pattern: &str, ports: I) -> Result<Self, FilterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let pattern = AddressPattern::parse(pattern)?;
        let rules = RuleSet::parse(ports)?;

        if pattern == AddressPattern::Wildcard && rules.covers_everything() {
            return Err(FilterError::RejectedGlobalWildcard);
        }

        Ok(Self { pattern, rules })
    }

    /// Address pattern of this line.
    pub fn pattern(&self) -> &AddressPattern {
        &self.pattern
    }

    /// Port rules of this line.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Split into pattern and rules.
    pub fn into_parts(self) -> (AddressPattern, RuleSet) {
        (self.pattern, self.rules)
    }
}
