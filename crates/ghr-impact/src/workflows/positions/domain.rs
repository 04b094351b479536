use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Source system a position or submission was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceKind {
    #[serde(rename = "B4")]
    B4,
    #[serde(rename = "VNDLY")]
    Vndly,
}

impl SourceKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::B4 => "B4",
            Self::Vndly => "VNDLY",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-position rollup by (declined, internal agency).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionCounts {
    pub ghr_submissions: usize,
    pub external_submissions: usize,
    pub ghr_declines: usize,
    pub external_declines: usize,
}

impl SubmissionCounts {
    fn record(&mut self, candidate: &CandidateSubmission) {
        let counter = match (candidate.is_declined, candidate.is_internal_agency) {
            (false, true) => &mut self.ghr_submissions,
            (false, false) => &mut self.external_submissions,
            (true, true) => &mut self.ghr_declines,
            (true, false) => &mut self.external_declines,
        };
        *counter += 1;
    }

    pub fn total(&self) -> usize {
        self.ghr_submissions
            + self.external_submissions
            + self.ghr_declines
            + self.external_declines
    }
}

/// One candidate proposed against a position, already classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateSubmission {
    pub name: String,
    pub agency: String,
    pub submit_date: Option<NaiveDateTime>,
    pub offer_date: Option<NaiveDateTime>,
    pub awarded_date: Option<NaiveDateTime>,
    pub ready_to_onboard_date: Option<NaiveDateTime>,
    pub is_declined: bool,
    pub decline_reason: Option<String>,
    pub hospital_decline_date: Option<NaiveDateTime>,
    pub agency_decline_date: Option<NaiveDateTime>,
    pub agency_retracted_date: Option<NaiveDateTime>,
    pub interview_date: Option<NaiveDateTime>,
    pub is_internal_agency: bool,
    pub is_active: bool,
    pub status: Option<String>,
}

/// A staffing order from either source, with its matched candidates.
///
/// The counters are derived: they change only through [`Position::push_candidate`], so they
/// always agree with `candidates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub source_system: SourceKind,
    pub position_id: String,
    pub program: Option<String>,
    pub facility: Option<String>,
    pub specialty: Option<String>,
    pub unit: Option<String>,
    pub cost_center: Option<String>,
    pub bill_rate: Option<f64>,
    pub bill_rate_estimated: bool,
    pub shift_hours: Option<String>,
    pub shift_time: Option<String>,
    pub time_type: Option<String>,
    pub hiring_manager: Option<String>,
    pub requisition_reason: Option<String>,
    pub num_submissions_reported: Option<i64>,
    pub num_positions: Option<i64>,
    pub date_added: Option<NaiveDateTime>,
    pub start_date: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub health_system: Option<String>,
    pub shift_diff: Option<String>,
    pub min_hours: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    candidates: Vec<CandidateSubmission>,
    #[serde(flatten)]
    counts: SubmissionCounts,
}

impl Position {
    /// Empty position; `position_id` is stored trimmed.
    pub fn new(source_system: SourceKind, position_id: &str) -> Self {
        Self {
            source_system,
            position_id: position_id.trim().to_string(),
            program: None,
            facility: None,
            specialty: None,
            unit: None,
            cost_center: None,
            bill_rate: None,
            bill_rate_estimated: false,
            shift_hours: None,
            shift_time: None,
            time_type: None,
            hiring_manager: None,
            requisition_reason: None,
            num_submissions_reported: None,
            num_positions: None,
            date_added: None,
            start_date: None,
            status: None,
            health_system: None,
            shift_diff: None,
            min_hours: None,
            start_time: None,
            end_time: None,
            candidates: Vec::new(),
            counts: SubmissionCounts::default(),
        }
    }

    pub fn push_candidate(&mut self, candidate: CandidateSubmission) {
        self.counts.record(&candidate);
        self.candidates.push(candidate);
    }

    pub fn candidates(&self) -> &[CandidateSubmission] {
        &self.candidates
    }

    pub fn counts(&self) -> SubmissionCounts {
        self.counts
    }

    /// Counts rebuilt from `candidates` alone.
    pub fn recount(&self) -> SubmissionCounts {
        let mut counts = SubmissionCounts::default();
        for candidate in &self.candidates {
            counts.record(candidate);
        }
        counts
    }
}
