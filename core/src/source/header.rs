use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// A single header card value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(v) => Some(*v as f64),
            HeaderValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Logical(true) => f.write_str("T"),
            HeaderValue::Logical(false) => f.write_str("F"),
            HeaderValue::Integer(v) => write!(f, "{v}"),
            HeaderValue::Real(v) => write!(f, "{v}"),
            HeaderValue::Text(v) => f.write_str(v.trim_end()),
        }
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        Self::Logical(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for HeaderValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Keyword to value mapping of one extension header.
///
/// Keywords are stored upper-case; lookups are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    cards: BTreeMap<String, HeaderValue>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<HeaderValue>) {
        self.cards.insert(key.to_ascii_uppercase(), value.into());
    }

    /// Builder form of [`Header::insert`].
    pub fn with(mut self, key: &str, value: impl Into<HeaderValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards.get(&key.to_ascii_uppercase())
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_f64)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(HeaderValue::as_i64)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_str).map(str::trim_end)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.cards.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Axis lengths in FITS order (`NAXIS1` first), empty if `NAXIS` is 0 or missing.
    pub fn axes(&self) -> Vec<usize> {
        let naxis = self.get_i64("NAXIS").unwrap_or(0).max(0) as usize;
        (1..=naxis)
            .map(|i| self.get_i64(&format!("NAXIS{i}")).unwrap_or(0).max(0) as usize)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Header, HeaderValue};

    #[test]
    fn lookups_ignore_case() {
        let header = Header::new().with("crval1", 150.25).with("EXTNAME", "SCI");
        assert_eq!(header.get_f64("CRVAL1"), Some(150.25));
        assert_eq!(header.get_str("extname"), Some("SCI"));
    }

    #[test]
    fn axes_follow_naxis() {
        let header = Header::new()
            .with("NAXIS", 3i64)
            .with("NAXIS1", 45i64)
            .with("NAXIS2", 44i64)
            .with("NAXIS3", 1400i64);
        assert_eq!(header.axes(), vec![45, 44, 1400]);
        assert!(Header::new().axes().is_empty());
    }

    #[test]
    fn display_trims_padded_strings() {
        assert_eq!(HeaderValue::from("MIRIFULONG  ").to_string(), "MIRIFULONG");
        assert_eq!(HeaderValue::from(true).to_string(), "T");
    }
}
