//! Connection filter tables: building and matching.
//!
//! A raw configuration maps address patterns (`10.0.0.1`, `10.0.0.0/24`,
//! `*`) to port patterns (`80`, `tcp 8000-8100`, `udp *`). Each line is
//! validated on its own and either contributes fully to the table or is
//! dropped.

mod builder;
mod connection;
mod entry;
mod table;

pub use builder::{parse_connection_filters, FilterTableBuilder};
pub use connection::{Connection, ConnectionFilters};
pub use entry::{AddressPattern, FilterEntry};
pub use table::FilterTable;

use crate::{Address, Protocol};

/// Check one endpoint of a connection against `table`.
///
/// Free-function form of [`FilterTable::is_blacklisted_connection`].
#[inline]
pub fn is_blacklisted_connection(
    table: &FilterTable,
    address: &Address,
    port: u16,
    protocol: Protocol,
) -> bool {
    table.is_blacklisted_connection(address, port, protocol)
}
