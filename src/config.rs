//! Filter configuration decoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::filter::{parse_connection_filters, FilterTable};

/// Raw address-pattern → port-patterns mapping, exactly as configured.
pub type RawFilters = BTreeMap<String, Vec<PortPattern>>;

/// Connection filter configuration.
///
/// ```yaml
/// source_excludes:
///   "*": ["9000"]
///   "10.0.0.10": [3333, "tcp 8000-8100"]
/// dest_excludes:
///   "10.0.0.0/24": ["8080", "udp 53"]
/// ```
///
/// Address keys are kept as written; invalid lines are only detected, and
/// dropped, when the tables are built. A line whose value has the wrong
/// shape (a float, a bool, a bare scalar instead of a list) is decoded into
/// a pattern that cannot parse, so only that line is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Filters applied to the local endpoint of a connection
    #[serde(default, deserialize_with = "lenient_filters")]
    pub source_excludes: RawFilters,
    /// Filters applied to the remote endpoint of a connection
    #[serde(default, deserialize_with = "lenient_filters")]
    pub dest_excludes: RawFilters,
}

impl FilterConfig {
    /// Decode a configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Decode a configuration from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Decode a YAML configuration from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// Load a configuration file. `.json` files are read as JSON, anything
    /// else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));

        let config = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_yaml_str(&content)?
        };

        log::debug!(
            "Loaded connection filters from {:?}: {} source, {} destination lines",
            path,
            config.source_excludes.len(),
            config.dest_excludes.len()
        );
        Ok(config)
    }

    /// Save the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Look up a filter set by name: `source` or `dest`/`destination`.
    pub fn filters(&self, name: &str) -> Result<&RawFilters> {
        match name.to_lowercase().as_str() {
            "source" | "src" => Ok(&self.source_excludes),
            "dest" | "destination" | "dst" => Ok(&self.dest_excludes),
            _ => Err(Error::Config(format!("unknown filter set: {}", name))),
        }
    }

    /// Build the source table.
    pub fn source_table(&self) -> FilterTable {
        parse_connection_filters(&self.source_excludes)
    }

    /// Build the destination table.
    pub fn dest_table(&self) -> FilterTable {
        parse_connection_filters(&self.dest_excludes)
    }
}

/// Decode a filter mapping without letting one badly typed line fail the
/// whole document. Only a non-mapping value is a document error.
fn lenient_filters<'de, D>(deserializer: D) -> std::result::Result<RawFilters, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(mapping) = Option::<serde_yaml::Mapping>::deserialize(deserializer)? else {
        return Ok(RawFilters::new());
    };

    Ok(mapping
        .into_iter()
        .map(|(key, value)| {
            let key = scalar_text(&key).unwrap_or_else(|| format!("{:?}", key));
            let ports = match value {
                Value::Sequence(items) => items.iter().map(PortPattern::from_value).collect(),
                other => vec![PortPattern::malformed(&other)],
            };
            (key, ports)
        })
        .collect())
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// One port pattern, accepted as a string (`"tcp 80"`) or an integer (`80`).
///
/// Any other value is kept in a form that fails to parse, so the line it
/// belongs to is rejected when the table is built.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortPattern(String);

impl PortPattern {
    fn from_value(value: &Value) -> Self {
        match scalar_text(value) {
            Some(text) => PortPattern(text),
            None => Self::malformed(value),
        }
    }

    // Debug output (`Bool(true)`, `Number(8080)`) never forms a valid token.
    fn malformed(value: &Value) -> Self {
        PortPattern(format!("{:?}", value))
    }

    /// The pattern text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PortPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortPattern {
    fn from(s: &str) -> Self {
        PortPattern(s.to_string())
    }
}

impl From<String> for PortPattern {
    fn from(s: String) -> Self {
        PortPattern(s)
    }
}
