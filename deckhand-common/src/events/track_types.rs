//! Track identifier type
//!
//! Callers name tracks with either a string or a number; both forms
//! round-trip through JSON unchanged.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Opaque, caller-supplied track identifier
///
/// Unique among the currently loaded tracks only. An ID may be reused once
/// its previous track has been unloaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrackId {
    /// Numeric identifier (JSON number)
    Number(i64),
    /// Textual identifier (JSON string)
    Text(String),
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackId::Number(n) => write!(f, "{}", n),
            TrackId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl TrackId {
    /// Interpret a URL path segment: integers become `Number`, anything else `Text`
    pub fn from_path_segment(segment: &str) -> Self {
        match segment.parse::<i64>() {
            Ok(n) => TrackId::Number(n),
            Err(_) => TrackId::Text(segment.to_string()),
        }
    }
}

impl FromStr for TrackId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_path_segment(s))
    }
}

impl From<&str> for TrackId {
    fn from(s: &str) -> Self {
        TrackId::Text(s.to_string())
    }
}

impl From<String> for TrackId {
    fn from(s: String) -> Self {
        TrackId::Text(s)
    }
}

impl From<i64> for TrackId {
    fn from(n: i64) -> Self {
        TrackId::Number(n)
    }
}
