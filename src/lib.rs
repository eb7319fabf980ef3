//! connfilter - Connection blacklist filters for network-monitoring agents.
//!
//! This crate turns a human-authored mapping of address patterns to port
//! patterns into an immutable table, and answers for every observed
//! connection whether it is blacklisted.
//!
//! # Features
//!
//! - **Exact host matching**: IPv4 and IPv6 addresses
//! - **CIDR matching**: `10.0.0.0/24`, `2001:db8::/55`
//! - **Wildcard address**: `*` applies port rules to every host
//! - **Port/protocol rules**: `80`, `8000-8100`, `*`, `tcp 22`, `udp *`
//! - **Forgiving configuration**: an invalid line is dropped on its own
//! - **Lock-free lookups**: tables are immutable and hot-reloaded by pointer swap
//!
//! # Quick Start
//!
//! ```
//! use connfilter::{parse_connection_filters, Address, Protocol};
//!
//! let table = parse_connection_filters([
//!     ("10.0.0.2", vec!["tcp 53361-53500", "udp 119"]),
//!     ("10.0.0.0/24", vec!["8080"]),
//!     ("*", vec!["9000"]),
//! ]);
//!
//! let host: Address = "10.0.0.2".parse().unwrap();
//! assert!(table.is_blacklisted_connection(&host, 53363, Protocol::Tcp));
//! assert!(!table.is_blacklisted_connection(&host, 53363, Protocol::Udp));
//! assert!(table.is_blacklisted_host("10.0.0.5", 8080, Protocol::Tcp));
//! assert!(table.is_blacklisted_host("192.168.1.1", 9000, Protocol::Udp));
//! ```
//!
//! # Matching Priority
//!
//! 1. Exact host rules
//! 2. CIDR rules (any containing block)
//! 3. Wildcard-address rules
//!
//! The first path with a matching port rule blacklists the connection.
//!
//! # Rejected Lines
//!
//! A line is dropped whole when its address is malformed, when any of its
//! port patterns is malformed, or when it pairs `*` with rules covering every
//! port and protocol (which would blacklist all traffic).

mod error;
mod global;
mod protocol;
mod shared;

pub mod address;
pub mod config;
pub mod filter;
pub mod rule;

// Re-export core types
pub use address::{parse_cidr, Address};
pub use error::{Error, FilterError, Result};
pub use protocol::{Protocol, ProtocolScope};

// Re-export filter types
pub use config::{FilterConfig, PortPattern};
pub use filter::{
    is_blacklisted_connection, parse_connection_filters, AddressPattern, Connection,
    ConnectionFilters, FilterEntry, FilterTable, FilterTableBuilder,
};

// Re-export hot reload
pub use shared::SharedFilters;

// Re-export global API functions
pub use global::{current_filters, is_blacklisted, reload_filters, reload_filters_from_path};
