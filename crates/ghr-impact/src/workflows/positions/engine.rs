use super::b4::B4Normalizer;
use super::classifier::classify;
use super::domain::{Position, SourceKind};
use super::normalizer::{unique_ids, Normalized, RawSubmission, RowError, SourceNormalizer};
use super::vndly::VndlyNormalizer;
use crate::store::{RowStore, SourceError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// One entry of the reported-errors side channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceIssue {
    pub source: SourceKind,
    pub error: String,
}

impl SourceIssue {
    fn source_failed(source: SourceKind, error: &SourceError) -> Self {
        Self {
            source,
            error: error.to_string(),
        }
    }

    fn row_skipped(source: SourceKind, error: &RowError) -> Self {
        Self {
            source,
            error: error.to_string(),
        }
    }
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsReport {
    pub positions: Vec<Position>,
    pub errors: Vec<SourceIssue>,
    pub unmatched_submissions: usize,
}

impl PositionsReport {
    pub fn count_for(&self, source: SourceKind) -> usize {
        self.positions
            .iter()
            .filter(|position| position.source_system == source)
            .count()
    }
}

/// Everything one source contributed to a run.
#[derive(Debug)]
pub struct SourceBatch {
    pub source: SourceKind,
    pub positions: Vec<Position>,
    pub submissions: Vec<RawSubmission>,
}

#[derive(Debug)]
pub struct Reconciled {
    pub positions: Vec<Position>,
    pub unmatched_submissions: usize,
}

/// Matches, classifies and counts, with no I/O.
///
/// Batches are processed in the order given. The id lookup spans every batch and a later
/// batch's position replaces an earlier one with the same id, so submissions for a shared
/// id attach to the later position. Output keeps batch order, then position order.
pub fn reconcile(batches: Vec<SourceBatch>) -> Reconciled {
    let mut positions = Vec::new();
    let mut submissions = Vec::new();
    for batch in batches {
        positions.extend(batch.positions);
        submissions.push(batch.submissions);
    }

    let mut lookup: HashMap<String, usize> = HashMap::with_capacity(positions.len());
    for (index, position) in positions.iter().enumerate() {
        lookup.insert(position.position_id.trim().to_string(), index);
    }

    let mut unmatched_submissions = 0;
    for submission in submissions.into_iter().flatten() {
        match lookup.get(submission.position_id().trim()) {
            Some(&index) => {
                let candidate = submission.to_candidate(classify(&submission));
                positions[index].push_candidate(candidate);
            }
            None => unmatched_submissions += 1,
        }
    }

    Reconciled {
        positions,
        unmatched_submissions,
    }
}

struct Gathered {
    batch: SourceBatch,
    issues: Vec<SourceIssue>,
}

/// Reads both sources and reconciles them into one report.
pub struct ReconciliationEngine {
    store: Arc<dyn RowStore>,
    normalizers: Vec<Box<dyn SourceNormalizer>>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn RowStore>, normalizers: Vec<Box<dyn SourceNormalizer>>) -> Self {
        Self { store, normalizers }
    }

    /// B4 first, then VNDLY.
    pub fn standard(store: Arc<dyn RowStore>) -> Self {
        Self::new(store, vec![Box::new(B4Normalizer), Box::new(VndlyNormalizer)])
    }

    pub fn store(&self) -> &dyn RowStore {
        self.store.as_ref()
    }

    pub fn run(&self) -> PositionsReport {
        let store = self.store.as_ref();
        let gathered: Vec<Gathered> = thread::scope(|scope| {
            let handles: Vec<_> = self
                .normalizers
                .iter()
                .map(|normalizer| {
                    let source = normalizer.kind();
                    (source, scope.spawn(move || gather(normalizer.as_ref(), store)))
                })
                .collect();

            handles
                .into_iter()
                .map(|(source, handle)| {
                    handle.join().unwrap_or_else(|_| Gathered {
                        batch: SourceBatch {
                            source,
                            positions: Vec::new(),
                            submissions: Vec::new(),
                        },
                        issues: vec![SourceIssue {
                            source,
                            error: "source reader panicked".to_string(),
                        }],
                    })
                })
                .collect()
        });

        let mut errors = Vec::new();
        let mut batches = Vec::with_capacity(gathered.len());
        for outcome in gathered {
            errors.extend(outcome.issues);
            batches.push(outcome.batch);
        }

        let reconciled = reconcile(batches);
        let report = PositionsReport {
            positions: reconciled.positions,
            errors,
            unmatched_submissions: reconciled.unmatched_submissions,
        };

        info!(
            positions = report.positions.len(),
            b4 = report.count_for(SourceKind::B4),
            vndly = report.count_for(SourceKind::Vndly),
            unmatched = report.unmatched_submissions,
            errors = report.errors.len(),
            "positions reconciled"
        );
        report
    }
}

/// Reads one source. Any failed query empties that source's batch and is reported.
fn gather(normalizer: &dyn SourceNormalizer, store: &dyn RowStore) -> Gathered {
    let source = normalizer.kind();
    match read_source(normalizer, store) {
        Ok((batch, row_errors)) => {
            for error in &row_errors {
                debug!(source = %source, error = %error, "source row skipped");
            }
            info!(
                source = %source,
                positions = batch.positions.len(),
                submissions = batch.submissions.len(),
                skipped = row_errors.len(),
                "source read"
            );
            Gathered {
                batch,
                issues: row_errors
                    .iter()
                    .map(|error| SourceIssue::row_skipped(source, error))
                    .collect(),
            }
        }
        Err(error) => {
            warn!(source = %source, error = %error, "source unavailable; continuing without it");
            Gathered {
                batch: SourceBatch {
                    source,
                    positions: Vec::new(),
                    submissions: Vec::new(),
                },
                issues: vec![SourceIssue::source_failed(source, &error)],
            }
        }
    }
}

fn read_source(
    normalizer: &dyn SourceNormalizer,
    store: &dyn RowStore,
) -> Result<(SourceBatch, Vec<RowError>), SourceError> {
    let Normalized {
        items: positions,
        mut issues,
    } = normalizer.fetch_positions(store)?;

    let ids = unique_ids(positions.iter().map(|position| position.position_id.as_str()));
    let submissions = normalizer.fetch_submissions(store, &ids)?;
    issues.extend(submissions.issues);

    Ok((
        SourceBatch {
            source: normalizer.kind(),
            positions,
            submissions: submissions.items,
        },
        issues,
    ))
}
