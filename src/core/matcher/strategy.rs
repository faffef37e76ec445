//! The ordered matching strategies and their predicates.
//!
//! Strategies are ordered from highest precision (the device-assigned
//! embedded original name, least likely to collide) to lowest
//! (substring containment), so a confident early signal short-circuits
//! the noisier heuristics below it.

use crate::core::index::ImageRecord;
use crate::core::rows::MetadataRow;

/// Absolute file-size tolerance in bytes (1 KiB)
pub const ABS_SIZE_TOLERANCE: u64 = 1024;

/// Cap on the relative file-size tolerance (100 KiB)
pub const MAX_RELATIVE_TOLERANCE: u64 = 100 * 1024;

/// Fraction of the declared size used for the relative tolerance
pub const RELATIVE_TOLERANCE_FACTOR: f64 = 0.05;

/// A legacy naming convention: rows whose filename carries one prefix
/// correspond to candidates whose filename carries another, with the
/// embedded numeric id as the join key.
#[derive(Debug, Clone, Copy)]
pub struct PrefixRule {
    /// Prefix on the row's filename
    pub row_prefix: &'static str,
    /// Prefix on the candidate's filename
    pub candidate_prefix: &'static str,
}

/// Known legacy prefix families. Add new entries here; the ladder picks
/// them up without control-flow changes.
pub const PREFIX_RULES: &[PrefixRule] = &[
    PrefixRule {
        row_prefix: "JHR",
        candidate_prefix: "Jobb bonus i Lillestrøm kommune",
    },
    PrefixRule {
        row_prefix: "SAL-",
        candidate_prefix: "Overlege Jacob Dag Berild",
    },
];

/// One predicate in the ordered matching ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Embedded original name equals the row's basename (case-insensitive)
    EmbeddedOriginalName,
    /// Byte size within the absolute 1 KiB tolerance
    AbsoluteSize,
    /// Byte size within the relative tolerance (5% capped at 100 KiB)
    RelativeSize,
    /// Exact filename equality (case-insensitive)
    ExactFilename,
    /// Filename-without-extension equality (case-insensitive)
    Basename,
    /// Numeric id match scoped to one legacy prefix family
    PrefixFamily(usize),
    /// Unscoped numeric id equality (row filename must contain a digit)
    NumericSequence,
    /// Basename substring containment in either direction
    SubstringContainment,
    /// Fallback: first candidate within the absolute size tolerance
    FallbackSize,
    /// Fallback: first candidate sharing enough basename words
    FallbackWordOverlap,
}

impl StrategyKind {
    /// The full strategy ladder, in evaluation order.
    ///
    /// The fallback kinds are not part of the ladder; they label
    /// resolutions from the secondary pass.
    pub fn ladder() -> Vec<StrategyKind> {
        let mut ladder = vec![
            StrategyKind::EmbeddedOriginalName,
            StrategyKind::AbsoluteSize,
            StrategyKind::RelativeSize,
            StrategyKind::ExactFilename,
            StrategyKind::Basename,
        ];
        ladder.extend((0..PREFIX_RULES.len()).map(StrategyKind::PrefixFamily));
        ladder.push(StrategyKind::NumericSequence);
        ladder.push(StrategyKind::SubstringContainment);
        ladder
    }

    /// Evaluate this strategy's predicate for one candidate.
    pub fn matches(&self, key: &RowKey, candidate: &ImageRecord) -> bool {
        match self {
            StrategyKind::EmbeddedOriginalName => {
                !candidate.embedded_original_name.is_empty()
                    && stem_lower(&candidate.embedded_original_name) == key.stem_lower
            }
            StrategyKind::AbsoluteSize => {
                key.declared_size > 0
                    && candidate.size_bytes.abs_diff(key.declared_size) <= ABS_SIZE_TOLERANCE
            }
            StrategyKind::RelativeSize => {
                key.declared_size > 0
                    && candidate.size_bytes.abs_diff(key.declared_size) <= key.relative_tolerance
            }
            StrategyKind::ExactFilename => candidate.filename.to_lowercase() == key.filename_lower,
            StrategyKind::Basename => stem_lower(&candidate.filename) == key.stem_lower,
            StrategyKind::PrefixFamily(i) => {
                let rule = &PREFIX_RULES[*i];
                !key.numeric_id.is_empty()
                    && key.filename.starts_with(rule.row_prefix)
                    && candidate.filename.starts_with(rule.candidate_prefix)
                    && numeric_id(&candidate.filename) == key.numeric_id
            }
            StrategyKind::NumericSequence => {
                // An all-zero digit run yields an empty id; that must not
                // join with digit-free candidates, whose id is also empty
                !key.numeric_id.is_empty() && numeric_id(&candidate.filename) == key.numeric_id
            }
            StrategyKind::SubstringContainment => {
                let candidate_stem = stem_lower(&candidate.filename);
                candidate_stem.contains(&key.stem_lower) || key.stem_lower.contains(&candidate_stem)
            }
            // Fallback kinds are labels, not ladder predicates
            StrategyKind::FallbackSize | StrategyKind::FallbackWordOverlap => false,
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::EmbeddedOriginalName => write!(f, "embedded original name"),
            StrategyKind::AbsoluteSize => write!(f, "size within 1 KiB"),
            StrategyKind::RelativeSize => write!(f, "size within relative tolerance"),
            StrategyKind::ExactFilename => write!(f, "exact filename"),
            StrategyKind::Basename => write!(f, "basename"),
            StrategyKind::PrefixFamily(i) => match PREFIX_RULES.get(*i) {
                Some(rule) => write!(f, "prefix family {}", rule.row_prefix),
                None => write!(f, "prefix family #{}", i),
            },
            StrategyKind::NumericSequence => write!(f, "numeric sequence"),
            StrategyKind::SubstringContainment => write!(f, "substring containment"),
            StrategyKind::FallbackSize => write!(f, "fallback size"),
            StrategyKind::FallbackWordOverlap => write!(f, "fallback word overlap"),
        }
    }
}

/// Precomputed row attributes shared by every predicate.
#[derive(Debug, Clone)]
pub struct RowKey {
    /// Row filename as exported
    pub filename: String,
    /// Row filename lower-cased
    pub filename_lower: String,
    /// Row basename (extension stripped) lower-cased
    pub stem_lower: String,
    /// Digit characters of the row filename, in order
    pub digits: String,
    /// Numeric id of the row filename (digits, leading zeros dropped)
    pub numeric_id: String,
    /// Declared size in bytes, zero if unknown
    pub declared_size: u64,
    /// Relative size tolerance for this row
    pub relative_tolerance: u64,
}

impl RowKey {
    pub fn new(row: &MetadataRow) -> Self {
        let filename = row.filename.trim().to_string();
        Self {
            filename_lower: filename.to_lowercase(),
            stem_lower: stem_lower(&filename),
            digits: digits(&filename),
            numeric_id: numeric_id(&filename),
            declared_size: row.declared_size_bytes,
            relative_tolerance: relative_tolerance(row.declared_size_bytes),
            filename,
        }
    }
}

/// The relative size tolerance: 5% of the declared size, capped at
/// 100 KiB. Zero when the size is unknown.
pub fn relative_tolerance(declared_size: u64) -> u64 {
    if declared_size == 0 {
        return 0;
    }
    let fraction = (declared_size as f64 * RELATIVE_TOLERANCE_FACTOR) as u64;
    fraction.min(MAX_RELATIVE_TOLERANCE)
}

/// Strip the last extension from a file name
pub fn stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Extension-stripped, lower-cased basename
pub fn stem_lower(name: &str) -> String {
    stem(name).to_lowercase()
}

/// The digit characters of a string, concatenated in order
pub fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The numeric id embedded in a file name: its digit characters with
/// leading zeros dropped, so `JHR-42` and `... 042` share the id `42`.
pub fn numeric_id(s: &str) -> String {
    let d = digits(s);
    d.trim_start_matches('0').to_string()
}
