pub mod runner;
pub mod splitter;

pub use runner::{parse_document, parse_file, BatchReport, FailedBlock, FailureKind};
pub use splitter::BlockSplitter;
