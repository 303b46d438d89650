//! Extraction of structured trading signals from chat-style text.

pub mod batch;
pub mod config;
pub mod execution;
pub mod monitoring;
pub mod signals;

use config::{ParserConfig, ParserVariant};
use signals::{SignalExtractor, SignalParser, StrictParser};

/// Build the extractor selected by `config.variant`.
pub fn build_extractor(config: &ParserConfig) -> Box<dyn SignalExtractor> {
    match config.variant {
        ParserVariant::Heuristic => Box::new(SignalParser::new(config)),
        ParserVariant::Strict => Box::new(StrictParser::new()),
    }
}
