//! OR'd collections of port rules.

use std::fmt;

use super::PortRule;
use crate::error::FilterError;
use crate::Protocol;

/// The rules attached to one address pattern.
///
/// A connection matches the set when any one rule matches it. Insertion order
/// is kept and duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<PortRule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every token of one address line.
    ///
    /// Fails on the first invalid token, so a line is accepted whole or not
    /// at all. An empty token list is rejected as well.
    pub fn parse<I>(tokens: I) -> Result<Self, FilterError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut set = Self::new();
        for token in tokens {
            set.insert(PortRule::parse(token.as_ref())?);
        }
        if set.is_empty() {
            return Err(FilterError::EmptyRuleSet);
        }
        Ok(set)
    }

    /// Add a rule. Returns `false` if it was already present.
    pub fn insert(&mut self, rule: PortRule) -> bool {
        if self.rules.contains(&rule) {
            return false;
        }
        self.rules.push(rule);
        true
    }

    /// Union `other` into this set.
    pub fn merge(&mut self, other: RuleSet) {
        for rule in other.rules {
            self.insert(rule);
        }
    }

    /// Check whether any rule matches `(port, protocol)`.
    #[inline]
    pub fn matches(&self, port: u16, protocol: Protocol) -> bool {
        self.rules.iter().any(|rule| rule.matches(port, protocol))
    }

    /// Whether the rules together cover every port of every protocol.
    ///
    /// `["*"]` does, and so does `["tcp *", "udp 0-1000", "udp 1001-65535"]`.
    pub fn covers_everything(&self) -> bool {
        [Protocol::Tcp, Protocol::Udp]
            .into_iter()
            .all(|protocol| self.covers_all_ports(protocol))
    }

    fn covers_all_ports(&self, protocol: Protocol) -> bool {
        let mut ranges: Vec<(u32, u32)> = self
            .rules
            .iter()
            .filter(|rule| rule.scope().admits(protocol))
            .map(|rule| (u32::from(rule.low()), u32::from(rule.high())))
            .collect();
        ranges.sort_unstable();

        // First port not yet covered
        let mut next = 0u32;
        for (low, high) in ranges {
            if low > next {
                return false;
            }
            next = next.max(high + 1);
        }
        next > u32::from(u16::MAX)
    }

    /// Number of distinct rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the set holds no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over the rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &PortRule> {
        self.rules.iter()
    }
}

impl FromIterator<PortRule> for RuleSet {
    fn from_iter<T: IntoIterator<Item = PortRule>>(iter: T) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", rule)?;
        }
        f.write_str("]")
    }
}
