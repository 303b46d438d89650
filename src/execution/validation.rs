use serde::Serialize;
use tracing::{info, warn};

use crate::signals::types::{Direction, Entry, Signal};

/// Outcome of checking a parsed signal against a reference price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    /// Price used as the entry: the first entry level, or the reference price
    /// for market/now entries.
    pub entry_price: f64,
    /// Effective stop price, with percentage stops resolved against `entry_price`.
    pub calculated_stop: Option<f64>,
    pub issues: Vec<ValidationError>,
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ValidationError {
    #[error("Reference price must be positive: {0}")]
    InvalidReferencePrice(f64),

    #[error("Target {target} is on the wrong side of entry {entry} for {direction}")]
    TargetWrongSide {
        target: f64,
        entry: f64,
        direction: Direction,
    },

    #[error("Stop {stop:.8} is on the wrong side of entry {entry} for {direction}")]
    StopWrongSide {
        stop: f64,
        entry: f64,
        direction: Direction,
    },

    #[error("Stop percentage too large: {0:.2}%")]
    StopPercentageTooLarge(f64),
}

/// Check direction consistency of a signal and resolve its stop price.
///
/// For LONG every target must be above the entry and the stop below it;
/// SHORT is the mirror image. Percentage stops are applied to the entry price.
pub fn validate_signal(signal: &Signal, reference_price: f64) -> ValidationReport {
    let mut issues = Vec::new();

    if !(reference_price.is_finite() && reference_price > 0.0) {
        issues.push(ValidationError::InvalidReferencePrice(reference_price));
    }

    let entry_price = match &signal.entry {
        Entry::Numeric(prices) => prices.first().copied().unwrap_or(reference_price),
        Entry::Marker(_) => reference_price,
    };
    let direction = signal.direction;

    for &target in &signal.targets {
        let wrong_side = match direction {
            Direction::Long => target <= entry_price,
            Direction::Short => target >= entry_price,
        };
        if wrong_side {
            issues.push(ValidationError::TargetWrongSide {
                target,
                entry: entry_price,
                direction,
            });
        }
    }

    let calculated_stop = signal.stop.first().map(|&stop| {
        if stop < 0.0 {
            stop_from_percentage(entry_price, -stop, direction)
        } else {
            stop
        }
    });

    if let Some(pct) = signal.stop_percentage() {
        if pct >= 100.0 && direction == Direction::Long {
            issues.push(ValidationError::StopPercentageTooLarge(pct));
        }
    }

    if let Some(stop) = calculated_stop {
        let wrong_side = match direction {
            Direction::Long => stop >= entry_price,
            Direction::Short => stop <= entry_price,
        };
        if wrong_side {
            issues.push(ValidationError::StopWrongSide {
                stop,
                entry: entry_price,
                direction,
            });
        }
    }

    let valid = issues.is_empty();
    if valid {
        info!("Signal validation passed: {} {}", signal.symbol, direction);
    } else {
        for issue in &issues {
            warn!("{}: {}", signal.symbol, issue);
        }
    }

    ValidationReport {
        valid,
        entry_price,
        calculated_stop,
        issues,
    }
}

/// Stop price `pct` percent away from `entry`, against the trade.
pub fn stop_from_percentage(entry: f64, pct: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Long => entry * (1.0 - pct / 100.0),
        Direction::Short => entry * (1.0 + pct / 100.0),
    }
}
