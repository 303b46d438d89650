use super::associate::{sort_dedup, Candidates};
use super::classify::{first_percentage, numbers};
use super::types::RejectReason;

/// Fill missing entry/target levels from number positions.
///
/// The first number in the block is the entry, the rest are targets; each
/// role is only filled when keyword association left it empty. Returns
/// whether the positional fallback was used.
pub fn infer_missing_levels(
    lines: &[&str],
    candidates: &mut Candidates,
) -> Result<bool, RejectReason> {
    if candidates.has_entry() && !candidates.targets.is_empty() {
        return Ok(false);
    }

    let all: Vec<f64> = lines.iter().flat_map(|l| numbers(l)).collect();
    if all.len() >= 2 {
        if !candidates.has_entry() {
            candidates.entries = vec![all[0]];
        }
        if candidates.targets.is_empty() {
            candidates.targets = all[1..].to_vec();
            sort_dedup(&mut candidates.targets);
        }
    }

    if !candidates.has_entry() || candidates.targets.is_empty() {
        return Err(RejectReason::InsufficientNumbers);
    }
    Ok(true)
}

/// Stop levels, never empty.
///
/// Keyword stops win; otherwise the first `<number>%` in the raw block,
/// otherwise the configured default. Percentages are returned negated.
pub fn resolve_stops(stops: Vec<f64>, original_text: &str, default_stop_pct: f64) -> Vec<f64> {
    if !stops.is_empty() {
        return stops;
    }
    match first_percentage(original_text) {
        Some(pct) => vec![-pct],
        None => vec![-default_stop_pct],
    }
}
