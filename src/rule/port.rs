//! Port/protocol rule parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;
use crate::{Protocol, ProtocolScope};

/// Textual form of the full port range.
pub const ANY_PORT: &str = "*";

/// A protocol scope paired with an inclusive port range.
///
/// Tokens follow `["tcp"|"udp"] (port | low "-" high | "*")`, with the
/// protocol keyword matched case-insensitively.
///
/// # Examples
/// ```
/// use connfilter::{Protocol, rule::PortRule};
///
/// let rule: PortRule = "tcp 8080-8090".parse().unwrap();
/// assert!(rule.matches(8085, Protocol::Tcp));
/// assert!(!rule.matches(8085, Protocol::Udp));
/// assert!(!rule.matches(80, Protocol::Tcp));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRule {
    scope: ProtocolScope,
    low: u16,
    high: u16,
}

impl PortRule {
    /// Every port, every protocol.
    pub const ANY: PortRule = PortRule {
        scope: ProtocolScope::Any,
        low: 0,
        high: u16::MAX,
    };

    /// Create a rule for the inclusive range `low..=high`.
    pub fn new(scope: ProtocolScope, low: u16, high: u16) -> Result<Self, FilterError> {
        if low > high {
            return Err(FilterError::InvalidPortRange { low, high });
        }
        Ok(Self { scope, low, high })
    }

    /// Create a rule for a single port.
    pub fn single(scope: ProtocolScope, port: u16) -> Self {
        Self {
            scope,
            low: port,
            high: port,
        }
    }

    /// Create a rule covering every port for `scope`.
    pub fn any_port(scope: ProtocolScope) -> Self {
        Self {
            scope,
            low: 0,
            high: u16::MAX,
        }
    }

    /// Parse a single port-pattern token.
    pub fn parse(token: &str) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidPortToken(token.to_string());

        let mut words = token.split_whitespace();
        let (scope, ports) = match (words.next(), words.next(), words.next()) {
            (Some(ports), None, None) => (ProtocolScope::Any, ports),
            (Some(keyword), Some(ports), None) => {
                let protocol = Protocol::parse(keyword).ok_or_else(invalid)?;
                (ProtocolScope::from(protocol), ports)
            }
            _ => return Err(invalid()),
        };

        if ports == ANY_PORT {
            return Ok(Self::any_port(scope));
        }

        match ports.split_once('-') {
            None => Ok(Self::single(scope, parse_port(ports, token)?)),
            Some((low, high)) => {
                if high.contains('-') {
                    return Err(invalid());
                }
                let low = parse_port(low, token)?;
                let high = parse_port(high, token)?;
                Self::new(scope, low, high)
            }
        }
    }

    /// Check whether an observed `(port, protocol)` pair falls under this rule.
    #[inline]
    pub fn matches(&self, port: u16, protocol: Protocol) -> bool {
        self.low <= port && port <= self.high && self.scope.admits(protocol)
    }

    /// Whether this rule covers every port for every protocol.
    pub fn is_full_wildcard(&self) -> bool {
        *self == Self::ANY
    }

    /// Protocol scope of this rule.
    pub fn scope(&self) -> ProtocolScope {
        self.scope
    }

    /// Lower bound (inclusive).
    pub fn low(&self) -> u16 {
        self.low
    }

    /// Upper bound (inclusive).
    pub fn high(&self) -> u16 {
        self.high
    }
}

/// Parse an unsigned decimal port. Digits that overflow are a value error,
/// anything else is a malformed token.
fn parse_port(value: &str, token: &str) -> Result<u16, FilterError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FilterError::InvalidPortToken(token.to_string()));
    }
    value
        .parse::<u16>()
        .map_err(|_| FilterError::InvalidPortValue(value.to_string()))
}

impl FromStr for PortRule {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortRule::parse(s)
    }
}

impl fmt::Display for PortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            ProtocolScope::Any => {}
            scope => write!(f, "{} ", scope)?,
        }
        if self.low == 0 && self.high == u16::MAX {
            f.write_str(ANY_PORT)
        } else if self.low == self.high {
            write!(f, "{}", self.low)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}
