//! Transport protocol types for connection matching.

use std::fmt;

use crate::error::FilterError;

/// Transport protocol of an observed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Protocol {
    /// TCP connection
    Tcp = 0,
    /// UDP connection
    Udp = 1,
}

impl Protocol {
    /// Parse a protocol keyword (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("tcp") {
            Some(Protocol::Tcp)
        } else if s.eq_ignore_ascii_case("udp") {
            Some(Protocol::Udp)
        } else {
            None
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Protocol {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::parse(s).ok_or_else(|| FilterError::InvalidProtocol(s.to_string()))
    }
}

/// Protocols a configured port rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProtocolScope {
    /// Both TCP and UDP
    #[default]
    Any,
    /// TCP only
    Tcp,
    /// UDP only
    Udp,
}

impl ProtocolScope {
    /// Check whether this scope admits `protocol`.
    #[inline]
    pub fn admits(self, protocol: Protocol) -> bool {
        matches!(
            (self, protocol),
            (ProtocolScope::Any, _)
                | (ProtocolScope::Tcp, Protocol::Tcp)
                | (ProtocolScope::Udp, Protocol::Udp)
        )
    }
}

impl From<Protocol> for ProtocolScope {
    fn from(protocol: Protocol) -> Self {
        match protocol {
            Protocol::Tcp => ProtocolScope::Tcp,
            Protocol::Udp => ProtocolScope::Udp,
        }
    }
}

impl fmt::Display for ProtocolScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolScope::Any => f.write_str("any"),
            ProtocolScope::Tcp => f.write_str("tcp"),
            ProtocolScope::Udp => f.write_str("udp"),
        }
    }
}
