use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Immediate-execution entry instead of a price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryMarker {
    Market,
    Now,
}

impl EntryMarker {
    pub fn from_word(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "market" => Some(EntryMarker::Market),
            "now" => Some(EntryMarker::Now),
            _ => None,
        }
    }
}

impl fmt::Display for EntryMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryMarker::Market => write!(f, "MARKET"),
            EntryMarker::Now => write!(f, "NOW"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entry {
    /// Price levels, sorted ascending without duplicates.
    Numeric(Vec<f64>),
    Marker(EntryMarker),
}

impl Entry {
    pub fn prices(&self) -> &[f64] {
        match self {
            Entry::Numeric(prices) => prices,
            Entry::Marker(_) => &[],
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Numeric(prices) => write!(f, "{}", join_levels(prices)),
            Entry::Marker(marker) => write!(f, "{}", marker),
        }
    }
}

/// A trading instruction extracted from one block of text.
///
/// Negative `stop` values are percentages of the entry price, non-negative
/// values are absolute prices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    pub entry: Entry,
    pub targets: Vec<f64>,
    pub stop: Vec<f64>,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub original_text: String,
}

impl Signal {
    /// Percentage of the first stop level, if it is percentage-encoded.
    pub fn stop_percentage(&self) -> Option<f64> {
        self.stop.first().filter(|s| **s < 0.0).map(|s| -s)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Signal(symbol='{}', direction='{}', entry=[{}], targets=[{}], stop=[{}])",
            self.symbol,
            self.direction,
            self.entry,
            join_levels(&self.targets),
            join_levels(&self.stop)
        )
    }
}

pub fn join_levels(levels: &[f64]) -> String {
    levels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Entry,
    Target,
    Stop,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Entry => write!(f, "entry"),
            Field::Target => write!(f, "target"),
            Field::Stop => write!(f, "stop"),
        }
    }
}

/// Why a block did not produce a signal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum RejectReason {
    #[error("no parsable text after normalization")]
    EmptyInput,

    #[error("no instrument symbol found")]
    NoSymbol,

    #[error("not enough numbers for entry and targets")]
    InsufficientNumbers,

    #[error("direction must be LONG or SHORT")]
    InvalidDirection,

    #[error("missing {0} line")]
    MissingField(Field),

    #[error("invalid {0} value")]
    InvalidField(Field),
}

/// One candidate-signal parser. Implementations must be stateless across blocks.
pub trait SignalExtractor {
    fn parse_block(&self, text: &str) -> Result<Signal, RejectReason>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(stop: Vec<f64>) -> Signal {
        Signal {
            symbol: "BTC/USDT".to_string(),
            direction: Direction::Long,
            entry: Entry::Numeric(vec![45000.0]),
            targets: vec![48000.0],
            stop,
            original_text: String::new(),
        }
    }

    #[test]
    fn test_stop_percentage() {
        assert_eq!(sample(vec![-2.75]).stop_percentage(), Some(2.75));
        assert_eq!(sample(vec![44000.0]).stop_percentage(), None);
    }

    #[test]
    fn test_display() {
        let signal = sample(vec![44000.0]);
        assert_eq!(
            signal.to_string(),
            "Signal(symbol='BTC/USDT', direction='LONG', entry=[45000], targets=[48000], stop=[44000])"
        );
        assert_eq!(Entry::Marker(EntryMarker::Now).to_string(), "NOW");
    }

    #[test]
    fn test_serialize_direction_uppercase() {
        let json = serde_json::to_string(&sample(vec![-3.0])).unwrap();
        assert!(json.contains("\"direction\":\"LONG\""));
        assert!(json.contains("\"numeric\":[45000.0]"));
        assert!(!json.contains("original_text"));
    }

    #[test]
    fn test_entry_marker_from_word() {
        assert_eq!(EntryMarker::from_word("Market"), Some(EntryMarker::Market));
        assert_eq!(EntryMarker::from_word("NOW"), Some(EntryMarker::Now));
        assert_eq!(EntryMarker::from_word("later"), None);
    }
}
