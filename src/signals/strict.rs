use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::normalize::normalize;
use super::parser::first_line;
use super::types::{
    Direction, Entry, EntryMarker, Field, RejectReason, Signal, SignalExtractor,
};

static PAIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[$#]?([A-Z0-9]{2,12}/[A-Z0-9]{2,12})$").unwrap());

static FIELD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(entry|target|stop)\s*:\s*(.*)$").unwrap());

/// Parser for the canonical four-line layout:
///
/// ```text
/// BTC/USDT LONG
/// Entry: 45000        (or: market / now)
/// Target: 48000
/// Stop: 44000         (or: 3%)
/// ```
///
/// Anything that does not fit is rejected; there is no inference and no
/// default stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictParser;

impl StrictParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, text: &str) -> Result<Signal, RejectReason> {
        let cleaned = normalize(text);
        let mut lines = cleaned.lines();
        let header = lines.next().ok_or(RejectReason::EmptyInput)?;
        let (symbol, direction) = parse_header(header)?;

        let (mut entry, mut target, mut stop) = (None, None, None);
        for line in lines {
            let Some(cap) = FIELD_PATTERN.captures(line) else { continue };
            let value = cap.get(2).map_or("", |m| m.as_str()).trim();
            match cap[1].to_ascii_lowercase().as_str() {
                "entry" => {
                    entry.get_or_insert(value);
                }
                "target" => {
                    target.get_or_insert(value);
                }
                _ => {
                    stop.get_or_insert(value);
                }
            }
        }

        let entry = parse_entry(entry.ok_or(RejectReason::MissingField(Field::Entry))?)?;
        let target = parse_price(target.ok_or(RejectReason::MissingField(Field::Target))?)
            .ok_or(RejectReason::InvalidField(Field::Target))?;
        let stop = parse_stop(stop.ok_or(RejectReason::MissingField(Field::Stop))?)?;

        Ok(Signal {
            symbol,
            direction,
            entry,
            targets: vec![target],
            stop: vec![stop],
            original_text: text.to_string(),
        })
    }
}

impl SignalExtractor for StrictParser {
    fn parse_block(&self, text: &str) -> Result<Signal, RejectReason> {
        self.parse(text).inspect_err(|reason| {
            debug!("Block rejected by strict parser ({}): {:?}", reason, first_line(text));
        })
    }
}

fn parse_header(header: &str) -> Result<(String, Direction), RejectReason> {
    let mut parts = header.split_whitespace();

    let symbol = parts
        .next()
        .and_then(|p| PAIR_PATTERN.captures(p))
        .map(|cap| cap[1].to_ascii_uppercase())
        .ok_or(RejectReason::NoSymbol)?;

    let direction = match parts.next().map(str::to_ascii_uppercase).as_deref() {
        Some("LONG") => Direction::Long,
        Some("SHORT") => Direction::Short,
        _ => return Err(RejectReason::InvalidDirection),
    };
    if parts.next().is_some() {
        return Err(RejectReason::InvalidDirection);
    }

    Ok((symbol, direction))
}

fn parse_entry(value: &str) -> Result<Entry, RejectReason> {
    if let Some(marker) = EntryMarker::from_word(value) {
        return Ok(Entry::Marker(marker));
    }
    parse_price(value)
        .map(|p| Entry::Numeric(vec![p]))
        .ok_or(RejectReason::InvalidField(Field::Entry))
}

fn parse_stop(value: &str) -> Result<f64, RejectReason> {
    let invalid = RejectReason::InvalidField(Field::Stop);
    match value.strip_suffix('%') {
        Some(pct) => {
            let pct = parse_price(pct.trim_end()).ok_or(invalid.clone())?;
            if pct >= 100.0 {
                return Err(invalid);
            }
            Ok(-pct)
        }
        None => parse_price(value).ok_or(invalid),
    }
}

/// A strictly positive, finite number; thousands separators allowed.
fn parse_price(value: &str) -> Option<f64> {
    value
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
