//! Canonical addresses and CIDR containment.

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::error::FilterError;

/// Textual form of the wildcard address.
pub const WILDCARD: &str = "*";

/// A canonical, comparable address.
///
/// `Wildcard` is not a host: it is produced by parsing `*` and is matched
/// through its own lookup path, never through equality with a concrete
/// address.
///
/// # Examples
/// ```
/// use connfilter::Address;
///
/// let a: Address = "10.0.0.1".parse().unwrap();
/// let b = Address::v4(0x0a00_0001);
/// assert_eq!(a, b);
/// assert!("*".parse::<Address>().unwrap().is_wildcard());
/// assert!("".parse::<Address>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Address {
    /// IPv4 host
    V4(Ipv4Addr),
    /// IPv6 host
    V6(Ipv6Addr),
    /// Matches every address during lookup
    Wildcard,
}

impl Address {
    /// Build an IPv4 address from its big-endian integer value.
    pub fn v4(bits: u32) -> Self {
        Address::V4(Ipv4Addr::from(bits))
    }

    /// Build an IPv6 address from its high and low 64-bit halves.
    pub fn v6(high: u64, low: u64) -> Self {
        Address::V6(Ipv6Addr::from((u128::from(high) << 64) | u128::from(low)))
    }

    /// Parse a plain address: dotted IPv4, IPv6 text, or `*`.
    ///
    /// A `/n` suffix is rejected here; use [`parse_cidr`] for patterns.
    pub fn parse(s: &str) -> Result<Self, FilterError> {
        Self::try_parse(s).ok_or_else(|| FilterError::InvalidAddress(s.to_string()))
    }

    /// Same as [`Address::parse`] without building an error value.
    pub fn try_parse(s: &str) -> Option<Self> {
        if s == WILDCARD {
            return Some(Address::Wildcard);
        }
        // Bare integers are not addresses, even though some legacy agents
        // interpreted them as raw address bits.
        if s.is_empty() || s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<IpAddr>().ok().map(Address::from)
    }

    /// Whether this is the wildcard sentinel.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Address::Wildcard)
    }

    /// Number of bits in the address family (0 for the wildcard).
    pub fn family_width(&self) -> u8 {
        match self {
            Address::V4(_) => 32,
            Address::V6(_) => 128,
            Address::Wildcard => 0,
        }
    }

    /// The underlying IP address, if this is a concrete host.
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Address::V4(v4) => Some(IpAddr::V4(*v4)),
            Address::V6(v6) => Some(IpAddr::V6(*v6)),
            Address::Wildcard => None,
        }
    }

    /// Check whether `candidate` falls inside the network `self/prefix_len`.
    ///
    /// Families never mix, and a wildcard prefix contains nothing.
    pub fn contains(&self, prefix_len: u8, candidate: &Address) -> bool {
        match (self, candidate) {
            (Address::V4(prefix), Address::V4(ip)) => Ipv4Net::new(*prefix, prefix_len)
                .map(|net| net.contains(ip))
                .unwrap_or(false),
            (Address::V6(prefix), Address::V6(ip)) => Ipv6Net::new(*prefix, prefix_len)
                .map(|net| net.contains(ip))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Network address of `self/prefix_len`, host bits cleared.
    pub(crate) fn network(&self, prefix_len: u8) -> Option<Address> {
        let ip = self.ip()?;
        IpNet::new(ip, prefix_len)
            .ok()
            .map(|net| Address::from(net.network()))
    }
}

/// Parse an address pattern with an optional `/prefix` suffix.
///
/// Without a suffix the prefix length is the full family width, so
/// `10.0.0.1` and `10.0.0.1/32` denote the same host. The wildcard takes no
/// suffix and reports a prefix length of 0.
pub fn parse_cidr(s: &str) -> Result<(Address, u8), FilterError> {
    let Some((addr, prefix)) = s.split_once('/') else {
        let address = Address::parse(s)?;
        return Ok((address, address.family_width()));
    };

    let invalid = || FilterError::InvalidAddress(s.to_string());

    let address = Address::parse(addr).map_err(|_| invalid())?;
    if address.is_wildcard() || prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let prefix_len = prefix
        .parse::<u8>()
        .ok()
        .filter(|len| *len <= address.family_width())
        .ok_or_else(invalid)?;

    Ok((address, prefix_len))
}

impl FromStr for Address {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::parse(s)
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Address::V4(v4),
            IpAddr::V6(v6) => Address::V6(v6),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Address::V4(ip)
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Address::V6(ip)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::V4(v4) => write!(f, "{}", v4),
            Address::V6(v6) => write!(f, "{}", v6),
            Address::Wildcard => f.write_str(WILDCARD),
        }
    }
}
