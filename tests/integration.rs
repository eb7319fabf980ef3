//! Integration tests against agent-style source and destination filter sets.

use connfilter::{
    is_blacklisted_connection, parse_connection_filters, Address, Connection, ConnectionFilters,
    FilterConfig, FilterTable, Protocol,
};

fn source_filters() -> FilterTable {
    parse_connection_filters([
        ("172.0.0.1", vec!["80", "10", "443"]),
        ("*", vec!["9000"]),
        ("::7f00:35:0:0", vec!["443"]),
        ("10.0.0.10", vec!["3333", "*"]),
        ("10.0.0.25", vec!["30", "ABCD"]),
        ("123.ABCD", vec!["*"]),
        ("172.0.0.2", vec!["80", "10", "443", "53361-53370", "100-100"]),
        ("::7f00:35:0:1", vec!["65536"]),
        ("10.0.0.11", vec!["3333", "*", "53361-53370"]),
        ("10.0.0.26", vec!["30", "53361-53360"]),
        ("10.0.0.1", vec!["tcp *", "53361-53370"]),
        ("10.0.0.2", vec!["tcp 53361-53500", "udp 119"]),
    ])
}

fn dest_filters() -> FilterTable {
    parse_connection_filters([
        ("10.0.0.0/24", vec!["8080", "8081", "10255"]),
        ("", vec!["1234"]),
        ("2001:db8::2:1", vec!["5001"]),
        ("2001:db8::2:1/55", vec!["80"]),
        ("*", vec!["*"]),
        ("2001:db8::2:2", vec!["3333 udp"]),
        ("10.0.0.3/24", vec!["30-ABC"]),
        ("10.0.0.4", vec!["udp *", "*"]),
        ("2001:db8::2:2/55", vec!["8080-8082-8085"]),
    ])
}

fn tcp(table: &FilterTable, host: &str, port: u16) -> bool {
    table.is_blacklisted_host(host, port, Protocol::Tcp)
}

#[test]
fn test_source_filters() {
    let source = source_filters();

    assert!(tcp(&source, "172.0.0.1", 10));
    assert!(tcp(&source, "*", 9000));
    assert!(tcp(&source, "10.0.1.24", 9000));
    assert!(tcp(&source, "::7f00:35:0:0", 443));
    assert!(tcp(&source, "10.0.0.10", 6666));
    assert!(tcp(&source, "10.0.0.10", 33));
    assert!(!tcp(&source, "10.0.0.25", 30));
    assert!(!tcp(&source, "123.ABCD", 30));

    assert!(tcp(&source, "172.0.0.2", 100));
    assert!(!tcp(&source, "::7f00:35:0:1", 100));
    assert!(tcp(&source, "10.0.0.11", 6666));
    assert!(!tcp(&source, "10.0.0.26", 30));
    assert!(tcp(&source, "10.0.0.1", 100));
    assert!(!source.is_blacklisted_host("10.0.0.2", 53363, Protocol::Udp));
    assert!(tcp(&source, "10.0.0.2", 53363));
}

#[test]
fn test_numeric_address_is_not_an_ipv6_alias() {
    let source = source_filters();

    // "0" is not an address, so only wildcard-address rules can apply.
    assert!(Address::parse("0").is_err());
    assert!(!tcp(&source, "0", 443));
    assert!(tcp(&source, "0", 9000));
}

#[test]
fn test_destination_filters() {
    let dest = dest_filters();

    assert!(tcp(&dest, "10.0.0.5", 8080));
    assert!(!tcp(&dest, "10.0.0.5", 80));
    assert!(!tcp(&dest, "", 1234));
    assert!(tcp(&dest, "2001:db8::2:1", 5001));
    assert!(tcp(&dest, "2001:db8::5:1", 80));
    assert!(!tcp(&dest, "*", 30));

    assert!(!dest.is_blacklisted_host("2001:db8::2:2", 3333, Protocol::Udp));
    assert!(!tcp(&dest, "10.0.0.3/24", 80));
    assert!(tcp(&dest, "10.0.0.4", 1234));
    assert!(!tcp(&dest, "2001:db8::2:2", 8082));

    assert!(!dest.has_wildcard());
    assert_eq!(dest.cidr_count(), 2);
}

#[test]
fn test_entry_atomicity() {
    let table = parse_connection_filters([("10.0.0.26", ["30", "53361-53360"])]);
    let host: Address = "10.0.0.26".parse().unwrap();

    assert!(table.is_empty());
    for port in [30, 53360, 53361] {
        assert!(!is_blacklisted_connection(&table, &host, port, Protocol::Tcp));
    }
}

#[test]
fn test_wildcard_port_at_specific_address() {
    let table = parse_connection_filters([("10.0.0.10", ["3333", "*"])]);

    assert!(tcp(&table, "10.0.0.10", 6666));
    assert!(tcp(&table, "10.0.0.10", 33));
    assert!(table.is_blacklisted_host("10.0.0.10", 0, Protocol::Udp));
    assert!(!tcp(&table, "10.0.0.11", 33));
}

#[test]
fn test_wildcard_address_with_specific_port() {
    let table = parse_connection_filters([("*", ["9000"])]);

    assert!(tcp(&table, "10.0.1.24", 9000));
    assert!(tcp(&table, "::1", 9000));
    assert!(!tcp(&table, "10.0.1.24", 9001));
    assert!(!tcp(&table, "10.0.1.24", 8999));
}

#[test]
fn test_global_wildcard_rejected() {
    let table = parse_connection_filters([("*", ["*"])]);

    assert!(table.is_empty());
    assert!(!tcp(&table, "*", 30));
    assert!(!tcp(&table, "10.0.0.1", 30));
}

#[test]
fn test_invalid_line_does_not_affect_others() {
    let table = parse_connection_filters([("", vec!["1234"]), ("10.0.0.7", vec!["1234"])]);

    assert!(tcp(&table, "10.0.0.7", 1234));
    assert!(!tcp(&table, "10.0.0.8", 1234));
    assert!(!tcp(&table, "", 1234));
}

#[test]
fn test_connection_filters_from_yaml() {
    let config = FilterConfig::from_yaml_str(
        r#"
source_excludes:
  "10.0.0.2": ["tcp 53361-53500", "udp 119"]
dest_excludes:
  "10.0.0.0/24": [8080, 8081, 10255]
  "*": ["*"]
"#,
    )
    .unwrap();
    let filters = ConnectionFilters::from_config(&config);

    let conn = |src: &str, dst: &str, protocol| {
        Connection::new(src.parse().unwrap(), dst.parse().unwrap(), protocol)
    };

    assert!(filters.is_blacklisted(&conn("10.0.0.2:53363", "1.1.1.1:443", Protocol::Tcp)));
    assert!(!filters.is_blacklisted(&conn("10.0.0.2:53363", "1.1.1.1:443", Protocol::Udp)));
    assert!(filters.is_blacklisted(&conn("192.168.1.1:40000", "10.0.0.9:10255", Protocol::Udp)));
    assert!(!filters.is_blacklisted(&conn("192.168.1.1:40000", "10.0.1.9:10255", Protocol::Udp)));
}
