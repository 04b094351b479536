use super::b4::B4Submission;
use super::classifier::Classification;
use super::domain::{CandidateSubmission, Position, SourceKind};
use super::vndly::VndlySubmission;
use crate::store::{RawRow, RowStore, SourceError};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Maps one source system's rows onto canonical positions and raw submissions.
///
/// Adding a source means implementing this trait and registering it with the engine.
pub trait SourceNormalizer: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Positions in emission order, plus issues for rows that could not be read.
    fn fetch_positions(&self, store: &dyn RowStore) -> Result<Normalized<Position>, SourceError>;

    /// Submissions whose trimmed position id is in `position_ids`, in source order.
    fn fetch_submissions(
        &self,
        store: &dyn RowStore,
        position_ids: &[String],
    ) -> Result<Normalized<RawSubmission>, SourceError>;
}

/// Rows a normalizer produced, and the ones it had to skip.
#[derive(Debug)]
pub struct Normalized<T> {
    pub items: Vec<T>,
    pub issues: Vec<RowError>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            issues: Vec::new(),
        }
    }
}

/// A single source row that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{table} row {row}: {message}")]
pub struct RowError {
    pub table: String,
    /// Zero-based row index within the fetched result.
    pub row: usize,
    pub message: String,
}

/// A submission row tagged with the source it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSubmission {
    B4(B4Submission),
    Vndly(VndlySubmission),
}

impl RawSubmission {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::B4(_) => SourceKind::B4,
            Self::Vndly(_) => SourceKind::Vndly,
        }
    }

    /// Trimmed identifier of the position this submission was made against.
    pub fn position_id(&self) -> &str {
        match self {
            Self::B4(row) => row.position_id(),
            Self::Vndly(row) => row.position_id(),
        }
    }

    pub fn to_candidate(&self, classification: Classification) -> CandidateSubmission {
        match self {
            Self::B4(row) => row.to_candidate(classification),
            Self::Vndly(row) => row.to_candidate(classification),
        }
    }
}

/// Decodes every row of `table`, collecting the failures instead of stopping at them.
pub(crate) fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<RawRow>) -> Normalized<T> {
    let mut normalized = Normalized::default();
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<T>(Value::Object(row)) {
            Ok(item) => normalized.items.push(item),
            Err(err) => normalized.issues.push(RowError {
                table: table.to_string(),
                row: index,
                message: err.to_string(),
            }),
        }
    }
    normalized
}

/// Distinct identifiers in first-seen order.
pub(crate) fn unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).map(str::to_string).collect()
}

/// Newest `date_added` first, undated last; equal keys keep source order.
pub(crate) fn sort_newest_first(positions: &mut [Position]) {
    positions.sort_by(|a, b| match (a.date_added, b.date_added) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
