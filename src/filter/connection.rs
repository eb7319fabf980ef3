//! Source/destination filtering of whole connections.

use std::net::SocketAddr;

use super::{parse_connection_filters, FilterTable};
use crate::address::Address;
use crate::config::FilterConfig;
use crate::Protocol;

/// An observed connection, as seen by the monitoring agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    /// Local endpoint address
    pub source: Address,
    /// Local endpoint port
    pub source_port: u16,
    /// Remote endpoint address
    pub dest: Address,
    /// Remote endpoint port
    pub dest_port: u16,
    /// Transport protocol
    pub protocol: Protocol,
}

impl Connection {
    /// Create a connection from its two socket endpoints.
    pub fn new(source: SocketAddr, dest: SocketAddr, protocol: Protocol) -> Self {
        Self {
            source: source.ip().into(),
            source_port: source.port(),
            dest: dest.ip().into(),
            dest_port: dest.port(),
            protocol,
        }
    }
}

/// The pair of tables an agent applies to every connection.
///
/// A connection is blacklisted when its source endpoint matches the source
/// table or its destination endpoint matches the destination table.
#[derive(Debug, Clone, Default)]
pub struct ConnectionFilters {
    source: FilterTable,
    dest: FilterTable,
}

impl ConnectionFilters {
    /// Combine already built tables.
    pub fn new(source: FilterTable, dest: FilterTable) -> Self {
        Self { source, dest }
    }

    /// Build both tables from a decoded configuration.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            source: parse_connection_filters(&config.source_excludes),
            dest: parse_connection_filters(&config.dest_excludes),
        }
    }

    /// Check whether `conn` should be dropped from reporting.
    pub fn is_blacklisted(&self, conn: &Connection) -> bool {
        self.source
            .is_blacklisted_connection(&conn.source, conn.source_port, conn.protocol)
            || self
                .dest
                .is_blacklisted_connection(&conn.dest, conn.dest_port, conn.protocol)
    }

    /// Table applied to source endpoints.
    pub fn source(&self) -> &FilterTable {
        &self.source
    }

    /// Table applied to destination endpoints.
    pub fn dest(&self) -> &FilterTable {
        &self.dest
    }
}
