use regex::Regex;
use std::sync::LazyLock;

use crate::config::ParserConfig;

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());

/// Splits documents into candidate blocks and spots post-trade reports.
#[derive(Debug, Clone)]
pub struct BlockSplitter {
    boundary_marker: String,
    report_phrases: Vec<String>,
}

impl BlockSplitter {
    pub fn new(boundary_marker: impl Into<String>, report_phrases: &[String]) -> Self {
        Self {
            boundary_marker: boundary_marker.into(),
            report_phrases: report_phrases.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &ParserConfig) -> Self {
        Self::new(config.boundary_marker.clone(), &config.report_phrases)
    }

    /// Raw blocks in document order.
    ///
    /// The boundary marker is used when it appears anywhere in the document,
    /// otherwise blocks are separated by blank lines. Whitespace-only blocks
    /// are dropped.
    pub fn split<'a>(&self, content: &'a str) -> Vec<&'a str> {
        let blocks: Vec<&str> = if content.contains(self.boundary_marker.as_str()) {
            content.split(self.boundary_marker.as_str()).collect()
        } else {
            BLANK_LINE.split(content).collect()
        };

        blocks.into_iter().filter(|b| !b.trim().is_empty()).collect()
    }

    /// Whether a block is a post-trade report rather than a new signal.
    pub fn is_report(&self, block: &str) -> bool {
        let lower = block.to_lowercase();
        self.report_phrases.iter().any(|p| lower.contains(p.as_str()))
    }
}

impl Default for BlockSplitter {
    fn default() -> Self {
        Self::from_config(&ParserConfig::default())
    }
}
