//! Error types for connfilter.

use thiserror::Error;

/// Error type for connfilter operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for connfilter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reason a single filter line was rejected.
///
/// These never escape [`parse_connection_filters`](crate::parse_connection_filters);
/// they only decide whether a line is dropped and what gets logged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Empty or malformed address pattern
    #[error("invalid address: {0:?}")]
    InvalidAddress(String),

    /// Port pattern with an unrecognized shape
    #[error("invalid port token: {0:?}")]
    InvalidPortToken(String),

    /// Port range whose lower bound exceeds its upper bound
    #[error("invalid port range: {low} > {high}")]
    InvalidPortRange { low: u16, high: u16 },

    /// Numeric port outside 0..=65535
    #[error("invalid port value: {0}")]
    InvalidPortValue(String),

    /// Unknown transport protocol keyword
    #[error("invalid protocol: {0:?}")]
    InvalidProtocol(String),

    /// Address `*` combined with rules covering every port and protocol
    #[error("wildcard address with a wildcard rule set would blacklist every connection")]
    RejectedGlobalWildcard,

    /// Address pattern without any port pattern
    #[error("no port patterns given")]
    EmptyRuleSet,
}
