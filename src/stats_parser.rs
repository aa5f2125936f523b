// Parse raw host text into typed key/value records and container addresses.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// One raw statistic value: all-digit text becomes an integer, anything else stays text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Integer(u64),
    Text(String),
}

impl RawValue {
    fn parse(value: &str) -> Self {
        if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
            // Digit strings beyond u64 fall through to text.
            if let Ok(n) = value.parse::<u64>() {
                return RawValue::Integer(n);
            }
        }
        RawValue::Text(value.to_string())
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            RawValue::Integer(n) => Some(*n),
            RawValue::Text(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Integer(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

/// Statistic name to raw value for one container in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStatRecord {
    values: BTreeMap<String, RawValue>,
}

impl RawStatRecord {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: RawValue) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Renders as `key: value` lines, the same shape [`parse_stats`] reads.
impl fmt::Display for RawStatRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.values {
            writeln!(f, "{}: {}", key, value)?;
        }
        Ok(())
    }
}

/// Parse `key: value` lines. Each non-empty line splits on its first colon and
/// both halves are trimmed. Lines without a colon are skipped; a repeated key
/// keeps its last value.
pub fn parse_stats(text: &str) -> RawStatRecord {
    let mut record = RawStatRecord::default();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            tracing::trace!(line, "skipping stats line without ':'");
            continue;
        };
        record.insert(key.trim(), RawValue::parse(value.trim()));
    }
    record
}

/// Extract addresses in host-reported order from `... IP: <addr>` lines.
pub fn parse_addresses(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| {
            let (_, addr) = line.split_once("IP:")?;
            let addr = addr.trim();
            (!addr.is_empty()).then(|| addr.to_string())
        })
        .collect()
}

/// Network address of a container at collection time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContainerAddress {
    Address(String),
    #[default]
    NoAddress,
}

impl ContainerAddress {
    /// Label value: the address, or an empty string when there is none.
    pub fn as_label(&self) -> &str {
        match self {
            ContainerAddress::Address(addr) => addr,
            ContainerAddress::NoAddress => "",
        }
    }
}

/// Pick the first non-loopback address, else the first address, else `NoAddress`.
/// Entries that are not IP literals count as non-loopback.
pub fn select_address(addresses: &[String]) -> ContainerAddress {
    addresses
        .iter()
        .find(|addr| !is_loopback(addr))
        .or_else(|| addresses.first())
        .map(|addr| ContainerAddress::Address(addr.clone()))
        .unwrap_or(ContainerAddress::NoAddress)
}

fn is_loopback(addr: &str) -> bool {
    addr.parse::<IpAddr>()
        .map(|ip| ip.is_loopback())
        .unwrap_or(false)
}
