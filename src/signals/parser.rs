use crate::config::ParserConfig;
use tracing::debug;

use super::associate::Associator;
use super::classify::{extract_direction, SymbolClassifier};
use super::inference::{infer_missing_levels, resolve_stops};
use super::normalize::normalize;
use super::types::{Entry, RejectReason, Signal, SignalExtractor};

/// Heuristic parser for free-form signal text.
///
/// Holds only read-only configuration, so one instance can parse any number
/// of blocks.
#[derive(Debug, Clone)]
pub struct SignalParser {
    symbols: SymbolClassifier,
    associator: Associator,
    default_stop_pct: f64,
}

impl SignalParser {
    pub fn new(config: &ParserConfig) -> Self {
        let reserved = config
            .keywords
            .all()
            .chain(config.ignored_symbol_words.iter().map(String::as_str));

        Self {
            symbols: SymbolClassifier::new(reserved),
            associator: Associator::new(config.keywords.clone()),
            default_stop_pct: config.default_stop_pct,
        }
    }

    pub fn with_default_stop(default_stop_pct: f64) -> Self {
        Self::new(&ParserConfig {
            default_stop_pct,
            ..ParserConfig::default()
        })
    }

    /// Parse one block into a signal.
    ///
    /// Steps run in a fixed order: symbol, direction, keyword association,
    /// positional fallback, stop resolution. The first failing step rejects
    /// the whole block.
    pub fn parse(&self, text: &str) -> Result<Signal, RejectReason> {
        let cleaned = normalize(text);
        if cleaned.is_empty() {
            return Err(RejectReason::EmptyInput);
        }

        let symbol = self.symbols.extract(&cleaned).ok_or(RejectReason::NoSymbol)?;
        let direction = extract_direction(&cleaned);

        let lines: Vec<&str> = cleaned.lines().collect();
        let mut candidates = self.associator.associate(&lines);

        if infer_missing_levels(&lines, &mut candidates)? {
            debug!("{}: positional fallback applied", symbol);
        }

        let entry = match candidates.entry_marker {
            Some(marker) if candidates.entries.is_empty() => Entry::Marker(marker),
            _ => Entry::Numeric(candidates.entries),
        };
        let stop = resolve_stops(candidates.stops, text, self.default_stop_pct);

        Ok(Signal {
            symbol,
            direction,
            entry,
            targets: candidates.targets,
            stop,
            original_text: text.to_string(),
        })
    }
}

impl Default for SignalParser {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

impl SignalExtractor for SignalParser {
    fn parse_block(&self, text: &str) -> Result<Signal, RejectReason> {
        self.parse(text).inspect_err(|reason| {
            debug!("Block rejected ({}): {:?}", reason, first_line(text));
        })
    }
}

pub(crate) fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::types::{Direction, EntryMarker};

    fn parser() -> SignalParser {
        SignalParser::with_default_stop(3.0)
    }

    fn assert_invariants(signal: &Signal) {
        assert!(!signal.targets.is_empty());
        assert!(!signal.stop.is_empty());
        assert_eq!(signal.symbol.matches('/').count(), 1);
        assert_eq!(signal.symbol, signal.symbol.to_uppercase());
    }

    #[test]
    fn test_complete_signal() {
        let text = "BTC/USDT LONG\nEntry: 45000\nTarget: 48000\nStop: 44000";
        let signal = parser().parse(text).unwrap();

        assert_eq!(signal.symbol, "BTC/USDT");
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.entry, Entry::Numeric(vec![45000.0]));
        assert_eq!(signal.targets, vec![48000.0]);
        assert_eq!(signal.stop, vec![44000.0]);
        assert_eq!(signal.original_text, text);
        assert_invariants(&signal);
    }

    #[test]
    fn test_missing_stop_uses_default() {
        let signal = parser()
            .parse("\nBTC/USDT LONG\nEntry: 45000\nTarget: 48000\n")
            .unwrap();
        assert_eq!(signal.stop, vec![-3.0]);
        assert_eq!(signal.stop_percentage(), Some(3.0));
    }

    #[test]
    fn test_configured_default_stop() {
        let signal = SignalParser::with_default_stop(5.0)
            .parse("ETH/USDT SHORT\nEntry: 3200\nTarget: 3000")
            .unwrap();
        assert_eq!(signal.stop, vec![-5.0]);
        assert_eq!(signal.direction, Direction::Short);
    }

    #[test]
    fn test_percentage_stops() {
        let high = parser()
            .parse("BTC/USDT LONG\nEntry: 45000\nTarget: 48000\nStop: 50%")
            .unwrap();
        assert_eq!(high.stop, vec![-50.0]);

        let decimal = parser()
            .parse("BTC/USDT LONG\nEntry: 45000\nTarget: 48000\nStop: 2.75%")
            .unwrap();
        assert_eq!(decimal.stop, vec![-2.75]);
    }

    #[test]
    fn test_percentage_anywhere_in_text() {
        let signal = parser()
            .parse("SOL/USDT LONG\nEntry: 100\nTarget: 120\nRisk 4% of balance")
            .unwrap();
        assert_eq!(signal.stop, vec![-4.0]);
    }

    #[test]
    fn test_comma_joined_targets() {
        let signal = parser()
            .parse("BTC/USDT LONG\nEntry: 45,000\nTP: 48000,49000,50000\nSL: 44000")
            .unwrap();
        assert_eq!(signal.entry, Entry::Numeric(vec![45000.0]));
        assert_eq!(signal.targets, vec![48000.0, 49000.0, 50000.0]);
        assert_eq!(signal.stop, vec![44000.0]);
        assert_invariants(&signal);
    }

    #[test]
    fn test_bare_symbol_positional_levels() {
        let signal = parser().parse("BTC LONG\n45000\n48000").unwrap();
        assert_eq!(signal.symbol, "BTC/USDT");
        assert_eq!(signal.entry, Entry::Numeric(vec![45000.0]));
        assert_eq!(signal.targets, vec![48000.0]);
        assert_invariants(&signal);
    }

    #[test]
    fn test_symbol_without_separator_is_accepted() {
        let signal = parser()
            .parse("BTCUSDT LONG\nEntry: 45000\nTarget: 48000\nStop: 44000")
            .unwrap();
        assert_eq!(signal.symbol, "BTC/USDT");
    }

    #[test]
    fn test_chat_style_signal() {
        let text = "💎 #ARB/USDT 🟢 LONG\n\
                    Entry zone:\n\
                    1.10 - 1.15\n\
                    Take profit:\n\
                    1.25\n\
                    1.40\n\
                    1.60\n\
                    Stop loss: 0.98\n\
                    Leverage 10x cross";
        let signal = parser().parse(text).unwrap();

        assert_eq!(signal.symbol, "ARB/USDT");
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.entry, Entry::Numeric(vec![1.10, 1.15]));
        assert_eq!(signal.targets, vec![1.25, 1.40, 1.60]);
        assert_eq!(signal.stop, vec![0.98]);
    }

    #[test]
    fn test_market_entry() {
        let signal = parser()
            .parse("ADA/USDT LONG\nEntry: market\nTarget: 0.60\nStop: 4%")
            .unwrap();
        assert_eq!(signal.entry, Entry::Marker(EntryMarker::Market));
        assert_eq!(signal.targets, vec![0.60]);
        assert_eq!(signal.stop, vec![-4.0]);
    }

    #[test]
    fn test_small_numbers() {
        let signal = parser()
            .parse("SHIB/USDT LONG\nEntry: 0.00001234\nTarget: 0.00001500\nStop: 0.00001000")
            .unwrap();
        assert_eq!(signal.entry, Entry::Numeric(vec![0.00001234]));
        assert_eq!(signal.targets, vec![0.000015]);
        assert_eq!(signal.stop, vec![0.00001]);
    }

    #[test]
    fn test_short_word_without_direction_keyword() {
        let signal = parser()
            .parse("XRP/USDT going short\nEntry 0.50\nTarget 0.45")
            .unwrap();
        assert_eq!(signal.direction, Direction::Short);
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        for text in ["", "   ", "\n\n\n", "  \n  \n  ", "🚀🚀"] {
            assert_eq!(parser().parse(text), Err(RejectReason::EmptyInput));
        }
    }

    #[test]
    fn test_no_symbol_rejected() {
        assert_eq!(
            parser().parse("Entry 45000\nTarget 48000"),
            Err(RejectReason::NoSymbol)
        );
    }

    #[test]
    fn test_not_enough_numbers_rejected() {
        assert_eq!(
            parser().parse("BTC/USDT LONG\nEntry: 45000\nTarget: high"),
            Err(RejectReason::InsufficientNumbers)
        );
    }

    #[test]
    fn test_parse_block_trait() {
        let extractor: &dyn SignalExtractor = &parser();
        assert!(extractor.parse_block("DOGE/USDT LONG\nEntry 0.08\nTarget 0.12").is_ok());
    }
}
