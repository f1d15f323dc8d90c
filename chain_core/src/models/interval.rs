//! Fixed resampling intervals.
//!
//! The dashboard only ever offers these five widths, so the type is a
//! closed enum rather than an open amount × unit pair. `Display` and
//! `FromStr` round-trip through the short forms ("1m", "5m", "15m", "30m",
//! "1h") for CLI/config ergonomics.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An interval string outside the fixed set.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown interval: {0} (expected one of 1m, 5m, 15m, 30m, 1h)")]
pub struct ParseIntervalError(pub String);

/// Bucket width for resampling, in trading minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// Full resolution; resampling is the identity at this width.
    #[serde(rename = "1m")]
    Min1,
    /// 5-minute buckets.
    #[serde(rename = "5m")]
    Min5,
    /// 15-minute buckets.
    #[serde(rename = "15m")]
    Min15,
    /// 30-minute buckets.
    #[serde(rename = "30m")]
    Min30,
    /// 60-minute buckets.
    #[serde(rename = "1h")]
    Hour1,
}

impl Interval {
    /// All selectable intervals, ascending by width.
    pub const ALL: [Interval; 5] = [
        Interval::Min1,
        Interval::Min5,
        Interval::Min15,
        Interval::Min30,
        Interval::Hour1,
    ];

    /// Bucket width in minutes.
    pub const fn minutes(self) -> u32 {
        match self {
            Interval::Min1 => 1,
            Interval::Min5 => 5,
            Interval::Min15 => 15,
            Interval::Min30 => 30,
            Interval::Hour1 => 60,
        }
    }

    /// True for the 1-minute width, where bucketing preserves fetch times.
    pub const fn is_unit(self) -> bool {
        matches!(self, Interval::Min1)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interval::Min1 => "1m",
            Interval::Min5 => "5m",
            Interval::Min15 => "15m",
            Interval::Min30 => "30m",
            Interval::Hour1 => "1h",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::Min1),
            "5m" => Ok(Interval::Min5),
            "15m" => Ok(Interval::Min15),
            "30m" => Ok(Interval::Min30),
            "1h" => Ok(Interval::Hour1),
            other => Err(ParseIntervalError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_parse_roundtrip() {
        for iv in Interval::ALL {
            let parsed: Interval = iv.to_string().parse().unwrap();
            assert_eq!(parsed, iv);
        }
    }

    #[test]
    fn minutes_ascend() {
        let mins: Vec<u32> = Interval::ALL.iter().map(|iv| iv.minutes()).collect();
        assert_eq!(mins, vec![1, 5, 15, 30, 60]);
    }

    #[test]
    fn unknown_interval_is_typed_error() {
        let err = "7m".parse::<Interval>().unwrap_err();
        assert_eq!(err, ParseIntervalError("7m".to_string()));
        assert!(err.to_string().contains("expected one of"));
    }

    #[test]
    fn only_unit_width_is_identity() {
        assert!(Interval::Min1.is_unit());
        assert!(!Interval::Min5.is_unit());
        assert!(!Interval::Hour1.is_unit());
    }
}
