//! Tie-breaking between candidates that satisfy the same strategy.
//!
//! Applied only after a strategy matched more than one candidate and
//! the size-tolerance narrowing failed to reduce the tie to one. The
//! engine never guesses among truly indistinguishable candidates.

use super::{MatchResult, StrategyKind};
use crate::core::index::ImageRecord;
use crate::core::rows::MetadataRow;

/// Timestamp tolerance in seconds (5 minutes)
pub const DATE_TOLERANCE_SECS: i64 = 300;

/// Break a tie between candidates, in order:
///
/// 1. Keep the candidates at the minimum absolute size difference; if
///    exactly one remains, resolve it.
/// 2. If the row's publish timestamp parses, compare it with each
///    candidate's modification timestamp; a uniquely closest candidate
///    under the 300-second tolerance resolves.
/// 3. Otherwise the row is ambiguous.
///
/// Malformed timestamps on either side are treated as infinitely far,
/// never as a failure.
pub fn disambiguate(row: &MetadataRow, strategy: StrategyKind, ties: Vec<ImageRecord>) -> MatchResult {
    if ties.is_empty() {
        return MatchResult::NoMatch;
    }
    if let [record] = ties.as_slice() {
        return MatchResult::Resolved {
            record: record.clone(),
            strategy,
        };
    }

    // 1. Closest declared size
    let size_diffs: Vec<u64> = ties
        .iter()
        .map(|c| c.size_bytes.abs_diff(row.declared_size_bytes))
        .collect();

    if let Some(min_size_diff) = size_diffs.iter().copied().min() {
        let survivors: Vec<&ImageRecord> = ties
            .iter()
            .zip(&size_diffs)
            .filter(|(_, &diff)| diff == min_size_diff)
            .map(|(c, _)| c)
            .collect();

        if let [record] = survivors.as_slice() {
            return MatchResult::Resolved {
                record: (*record).clone(),
                strategy,
            };
        }
    }

    // 2. Closest modification timestamp, within tolerance
    if let Some(published) = row.published_at_parsed() {
        let time_diffs: Vec<Option<i64>> = ties
            .iter()
            .map(|c| {
                c.modified_at
                    .map(|modified| (modified - published).num_seconds().abs())
            })
            .collect();

        if let Some(min_diff) = time_diffs.iter().filter_map(|d| *d).min() {
            let closest: Vec<&ImageRecord> = ties
                .iter()
                .zip(&time_diffs)
                .filter(|(_, diff)| **diff == Some(min_diff))
                .map(|(c, _)| c)
                .collect();

            if min_diff < DATE_TOLERANCE_SECS {
                if let [record] = closest.as_slice() {
                    return MatchResult::Resolved {
                        record: (*record).clone(),
                        strategy,
                    };
                }
            }
        }
    }

    // 3. Truly indistinguishable
    MatchResult::Ambiguous { candidates: ties }
}
