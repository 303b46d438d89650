use crate::config::KeywordConfig;

use super::classify::{entry_marker_word, number_tokens, numbers};
use super::types::EntryMarker;

/// How many lines after a bare target label are scanned for target levels.
const TARGET_LOOKAHEAD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    Stop,
    Entry,
    Target,
}

/// Numbers tied to a role by keyword proximity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidates {
    pub entries: Vec<f64>,
    pub targets: Vec<f64>,
    pub stops: Vec<f64>,
    /// Set when an entry line names `market`/`now` instead of a price.
    pub entry_marker: Option<EntryMarker>,
}

impl Candidates {
    pub fn sort_and_dedup(&mut self) {
        sort_dedup(&mut self.entries);
        sort_dedup(&mut self.targets);
        sort_dedup(&mut self.stops);
    }

    pub fn has_entry(&self) -> bool {
        !self.entries.is_empty() || self.entry_marker.is_some()
    }
}

pub fn sort_dedup(values: &mut Vec<f64>) {
    values.sort_by(|a, b| a.total_cmp(b));
    values.dedup();
}

/// Walks normalized lines and assigns numbers to entry, target and stop.
#[derive(Debug, Clone)]
pub struct Associator {
    keywords: KeywordConfig,
}

impl Associator {
    pub fn new(keywords: KeywordConfig) -> Self {
        let lower = |set: Vec<String>| -> Vec<String> {
            set.into_iter().map(|k| k.to_lowercase()).collect()
        };
        Self {
            keywords: KeywordConfig {
                entry: lower(keywords.entry),
                target: lower(keywords.target),
                stop: lower(keywords.stop),
            },
        }
    }

    /// Role of a line; stop keywords take precedence over entry, entry over target.
    pub fn classify_line(&self, line: &str) -> Option<LineRole> {
        let lower = line.to_lowercase();
        let hit = |set: &[String]| set.iter().any(|kw| lower.contains(kw.as_str()));

        if hit(&self.keywords.stop) {
            Some(LineRole::Stop)
        } else if hit(&self.keywords.entry) {
            Some(LineRole::Entry)
        } else if hit(&self.keywords.target) {
            Some(LineRole::Target)
        } else {
            None
        }
    }

    pub fn associate(&self, lines: &[&str]) -> Candidates {
        let roles: Vec<Option<LineRole>> = lines.iter().map(|l| self.classify_line(l)).collect();
        let mut out = Candidates::default();

        for (i, line) in lines.iter().enumerate() {
            let Some(role) = roles[i] else { continue };

            // a labelled next line speaks for itself
            let next = lines
                .get(i + 1)
                .filter(|_| roles.get(i + 1).copied().flatten().is_none());

            match role {
                LineRole::Stop => {
                    out.stops.extend(number_tokens(line).iter().map(|t| t.as_stop()));
                    if let Some(next) = next {
                        out.stops.extend(number_tokens(next).iter().map(|t| t.as_stop()));
                    }
                }
                LineRole::Entry => {
                    let own = numbers(line);
                    let following = next.map(|n| numbers(n)).unwrap_or_default();
                    if own.is_empty() && following.is_empty() && out.entry_marker.is_none() {
                        out.entry_marker = entry_marker_word(line);
                    }
                    out.entries.extend(own);
                    out.entries.extend(following);
                }
                LineRole::Target => {
                    let own = numbers(line);
                    if own.is_empty() {
                        let end = (i + 1 + TARGET_LOOKAHEAD).min(lines.len());
                        for j in i + 1..end {
                            if roles[j].is_some() {
                                break;
                            }
                            out.targets.extend(numbers(lines[j]));
                        }
                    }
                    out.targets.extend(own);
                }
            }
        }

        out.sort_and_dedup();
        out
    }
}
