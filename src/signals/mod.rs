pub mod associate;
pub mod classify;
pub mod inference;
pub mod normalize;
pub mod parser;
pub mod strict;
pub mod types;

pub use parser::SignalParser;
pub use strict::StrictParser;
pub use types::{Direction, Entry, EntryMarker, RejectReason, Signal, SignalExtractor};
