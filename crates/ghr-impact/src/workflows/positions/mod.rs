//! Position–submission reconciliation across the B4 and VNDLY source systems.
//!
//! Each source has a normalizer that turns its rows into canonical [`Position`]s and raw
//! submissions. The engine matches submissions to positions by trimmed id, classifies
//! them and rolls up per-position counts, degrading to the remaining source when one
//! cannot be read.

pub mod b4;
pub mod classifier;
pub mod domain;
pub mod engine;
pub(crate) mod fields;
pub mod normalizer;
pub mod router;
pub mod stats;
pub mod vndly;

#[cfg(test)]
mod tests;

pub use b4::{B4Normalizer, B4Submission};
pub use classifier::{classify, is_internal_agency, Classification, INTERNAL_AGENCY_TOKENS};
pub use domain::{CandidateSubmission, Position, SourceKind, SubmissionCounts};
pub use engine::{
    reconcile, PositionsReport, Reconciled, ReconciliationEngine, SourceBatch, SourceIssue,
};
pub use fields::parse_datetime;
pub use normalizer::{Normalized, RawSubmission, RowError, SourceNormalizer};
pub use router::positions_router;
pub use stats::{placement_stats, Placement, PlacementStats};
pub use vndly::{VndlyNormalizer, VndlySubmission};
