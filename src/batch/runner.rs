use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::signals::types::{RejectReason, Signal, SignalExtractor};

use super::splitter::BlockSplitter;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FailureKind {
    /// Post-trade report, filtered before extraction.
    Report,
    Rejected(RejectReason),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Report => write!(f, "report"),
            FailureKind::Rejected(reason) => write!(f, "rejected: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedBlock {
    pub text: String,
    pub kind: FailureKind,
}

/// Accepted signals and failed blocks of one or more documents.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub signals: Vec<Signal>,
    pub failed: Vec<FailedBlock>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.signals.len() + self.failed.len()
    }

    /// accepted / (accepted + failed), 0.0 for an empty batch.
    pub fn accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.signals.len() as f64 / total as f64,
        }
    }

    pub fn report_count(&self) -> usize {
        self.failed
            .iter()
            .filter(|f| f.kind == FailureKind::Report)
            .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.failed.len() - self.report_count()
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.signals.extend(other.signals);
        self.failed.extend(other.failed);
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Accuracy: {:.2}% ({}/{})",
            self.accuracy() * 100.0,
            self.signals.len(),
            self.total()
        )
    }
}

/// Parse every block of a document. One bad block never affects its siblings.
pub fn parse_document<E: SignalExtractor + ?Sized>(
    extractor: &E,
    splitter: &BlockSplitter,
    content: &str,
) -> BatchReport {
    let mut report = BatchReport::default();

    for block in splitter.split(content) {
        if splitter.is_report(block) {
            debug!("Skipping report block");
            report.failed.push(FailedBlock {
                text: block.to_string(),
                kind: FailureKind::Report,
            });
            continue;
        }

        match extractor.parse_block(block) {
            Ok(signal) => report.signals.push(signal),
            Err(reason) => report.failed.push(FailedBlock {
                text: block.to_string(),
                kind: FailureKind::Rejected(reason),
            }),
        }
    }

    report
}

pub fn parse_file<E: SignalExtractor + ?Sized>(
    extractor: &E,
    splitter: &BlockSplitter,
    path: impl AsRef<Path>,
) -> Result<BatchReport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read signal file: {}", path.display()))?;

    let report = parse_document(extractor, splitter, &content);
    info!(
        "{}: {} signals, {} rejected, {} reports",
        path.display(),
        report.signals.len(),
        report.rejected_count(),
        report.report_count()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::parser::SignalParser;
    use crate::signals::strict::StrictParser;

    const DOC: &str = "BTC/USDT LONG\nEntry: 45000\nTarget: 48000\nStop: 44000\n\n\
                       #BTC/USDT Target reached\nProfit 12%\n\n\
                       hello there\n\n\
                       ETH/USDT SHORT\nEntry: 3200\nTarget: 3000\n";

    #[test]
    fn test_parse_document() {
        let report = parse_document(&SignalParser::default(), &BlockSplitter::default(), DOC);

        assert_eq!(report.signals.len(), 2);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.report_count(), 1);
        assert_eq!(report.rejected_count(), 1);
        assert_eq!(report.signals[0].symbol, "BTC/USDT");
        assert_eq!(report.signals[1].symbol, "ETH/USDT");
        assert_eq!(report.failed[0].kind, FailureKind::Report);
        assert_eq!(report.failed[1].text, "hello there");
        assert!((report.accuracy() - 0.5).abs() < 1e-9);
        assert_eq!(report.to_string(), "Accuracy: 50.00% (2/4)");
    }

    #[test]
    fn test_strict_extractor_in_batch() {
        let extractor: Box<dyn SignalExtractor> = Box::new(StrictParser::new());
        let report = parse_document(extractor.as_ref(), &BlockSplitter::default(), DOC);
        // the second signal has no stop line
        assert_eq!(report.signals.len(), 1);
        assert_eq!(
            report.failed.last().map(|f| &f.kind),
            Some(&FailureKind::Rejected(RejectReason::MissingField(
                crate::signals::types::Field::Stop
            )))
        );
    }

    #[test]
    fn test_empty_batch_accuracy() {
        let report = parse_document(&SignalParser::default(), &BlockSplitter::default(), "\n \n");
        assert_eq!(report.total(), 0);
        assert_eq!(report.accuracy(), 0.0);
    }

    #[test]
    fn test_merge() {
        let splitter = BlockSplitter::default();
        let parser = SignalParser::default();
        let mut total = parse_document(&parser, &splitter, DOC);
        total.merge(parse_document(&parser, &splitter, "SOL/USDT LONG\nEntry 100\nTarget 120"));
        assert_eq!(total.signals.len(), 3);
        assert_eq!(total.total(), 5);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = parse_file(
            &SignalParser::default(),
            &BlockSplitter::default(),
            "no/such/signals.txt",
        );
        assert!(result.is_err());
    }
}
