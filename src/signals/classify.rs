use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use super::types::{Direction, EntryMarker};

static SYMBOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[$#]?([A-Z0-9]{2,12}(?:/[A-Z]{2,12})?)").unwrap()
});

static DIRECTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(LONG|SHORT|BUY|SELL)\b").unwrap());

static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:,[0-9]{3})*(?:[.,][0-9]+)?(?:[eE]-?[0-9]+)?").unwrap()
});

static PLAIN_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?(?:[eE]-?[0-9]+)?").unwrap());

static PERCENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*%").unwrap());

const DEFAULT_QUOTE: &str = "USDT";

/// A number found in a line, with whether it was written as a percentage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberToken {
    pub value: f64,
    pub percent: bool,
}

impl NumberToken {
    /// Stop-level encoding: percentages become negative.
    pub fn as_stop(&self) -> f64 {
        if self.percent {
            -self.value
        } else {
            self.value
        }
    }
}

/// Finds the instrument symbol of a block.
///
/// Candidates equal to a reserved word (direction words, line keywords,
/// ignored words) or made of digits only never win.
#[derive(Debug, Clone)]
pub struct SymbolClassifier {
    reserved: HashSet<String>,
}

impl SymbolClassifier {
    pub fn new<'a>(reserved: impl IntoIterator<Item = &'a str>) -> Self {
        let mut reserved: HashSet<String> =
            reserved.into_iter().map(|w| w.to_ascii_uppercase()).collect();
        for word in ["LONG", "SHORT", "BUY", "SELL"] {
            reserved.insert(word.to_string());
        }
        Self { reserved }
    }

    pub fn extract(&self, text: &str) -> Option<String> {
        let mut candidates: Vec<&str> = SYMBOL_PATTERN
            .captures_iter(text)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .filter(|c| self.is_eligible(c))
            .collect();

        // stable sort keeps the earliest among equally long candidates
        candidates.sort_by(|a, b| b.len().cmp(&a.len()));
        candidates.into_iter().find_map(canonicalize_symbol)
    }

    fn is_eligible(&self, candidate: &str) -> bool {
        if candidate.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        !self.reserved.contains(&candidate.to_ascii_uppercase())
    }
}

/// Bring a raw symbol token into `BASE/QUOTE` form.
///
/// The "USDT"/"BTC" checks are plain substring checks, so a ticker such as
/// `BTC2` skips the up-front quote append. Anything still lacking a separator
/// gets `/USDT`; more than one separator is not a symbol.
pub fn canonicalize_symbol(raw: &str) -> Option<String> {
    let mut symbol = raw.to_ascii_uppercase();
    if !symbol.contains(DEFAULT_QUOTE) && !symbol.contains("BTC") {
        symbol.push('/');
        symbol.push_str(DEFAULT_QUOTE);
    }
    symbol = symbol.replace(DEFAULT_QUOTE, "/USDT");

    loop {
        let collapsed = symbol.replace("/USDT/USDT", "/USDT").replace("//", "/");
        if collapsed == symbol {
            break;
        }
        symbol = collapsed;
    }

    let symbol = symbol.trim_matches('/');
    if symbol.is_empty() {
        return None;
    }
    match symbol.matches('/').count() {
        0 => Some(format!("{}/{}", symbol, DEFAULT_QUOTE)),
        1 => Some(symbol.to_string()),
        _ => None,
    }
}

pub fn extract_direction(text: &str) -> Direction {
    let mut found_any = false;
    for cap in DIRECTION_PATTERN.captures_iter(text) {
        found_any = true;
        let word = cap[1].to_ascii_uppercase();
        if word == "LONG" || word == "BUY" {
            return Direction::Long;
        }
    }

    if found_any || text.to_ascii_lowercase().contains("short") {
        Direction::Short
    } else {
        Direction::Long
    }
}

/// All numbers in a line, in order.
///
/// Digits glued to letters (`TP1`, `10x`, `TEST00`) are labels, not prices,
/// and are skipped along with anything that fails to convert.
pub fn number_tokens(line: &str) -> Vec<NumberToken> {
    let bytes = line.as_bytes();
    number_matches(line)
        .into_iter()
        .filter(|m| {
            let before = m.start().checked_sub(1).map(|i| bytes[i]);
            let after = bytes.get(m.end()).copied();
            !before.is_some_and(|b| b.is_ascii_alphabetic())
                && !after.is_some_and(|b| b.is_ascii_alphabetic())
        })
        .filter_map(|m| {
            let value = m.as_str().replace(',', "").parse::<f64>().ok()?;
            if !value.is_finite() {
                return None;
            }
            let percent = line[m.end()..].trim_start().starts_with('%');
            Some(NumberToken { value, percent })
        })
        .collect()
}

/// Number spans of a line. A thousands group only counts when it ends the
/// digit run, so `48000,49000,50000` is three numbers, not `48000,490`.
fn number_matches(line: &str) -> Vec<regex::Match<'_>> {
    let bytes = line.as_bytes();
    let mut matches = Vec::new();
    let mut pos = 0;

    while let Some(m) = NUMBER_PATTERN.find_at(line, pos) {
        let split_group = m.as_str().contains(',')
            && bytes.get(m.end()).is_some_and(|b| b.is_ascii_digit());
        let m = if split_group {
            PLAIN_NUMBER_PATTERN
                .find_at(line, m.start())
                .filter(|plain| plain.start() == m.start())
                .unwrap_or(m)
        } else {
            m
        };
        pos = m.end();
        matches.push(m);
    }

    matches
}

pub fn numbers(line: &str) -> Vec<f64> {
    number_tokens(line).into_iter().map(|t| t.value).collect()
}

/// First `<number>%` in the text.
pub fn first_percentage(text: &str) -> Option<f64> {
    PERCENT_PATTERN
        .captures(text)
        .and_then(|cap| cap[1].parse::<f64>().ok())
}

/// Whole-word entry marker (`market` / `now`) in a line.
pub fn entry_marker_word(line: &str) -> Option<EntryMarker> {
    line.split(|c: char| !c.is_ascii_alphanumeric())
        .find_map(EntryMarker::from_word)
}
