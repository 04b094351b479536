use super::classifier::Classification;
use super::domain::{CandidateSubmission, Position, SourceKind};
use super::fields;
use super::normalizer::{
    decode_rows, sort_newest_first, Normalized, RawSubmission, SourceNormalizer,
};
use crate::store::{RawRow, RowStore, SourceError};
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

pub const JOB_TABLE: &str = "STAGING_VNDLY_JOBS";
pub const SUBMISSION_TABLE: &str = "STAGING_VNDLY_SUBMISSIONS";

/// Only jobs in this state are open positions.
pub const ACTIVE_JOB_STATUS: &str = "Active";

#[derive(Debug, Deserialize)]
struct JobRow {
    #[serde(rename = "Job Id", deserialize_with = "fields::required_text")]
    job_id: String,
    #[serde(rename = "Job Category", default, deserialize_with = "fields::text")]
    category: Option<String>,
    #[serde(rename = "Facility", default, deserialize_with = "fields::text")]
    facility: Option<String>,
    #[serde(rename = "Health System", default, deserialize_with = "fields::text")]
    health_system: Option<String>,
    #[serde(rename = "Job Title", default, deserialize_with = "fields::text")]
    title: Option<String>,
    #[serde(rename = "Job Approval Date", default, deserialize_with = "fields::datetime")]
    approval_date: Option<NaiveDateTime>,
    #[serde(rename = "Organization Unit (Job)", default, deserialize_with = "fields::text")]
    organization_unit: Option<String>,
    #[serde(rename = "Charge Code - Cost Center", default, deserialize_with = "fields::text")]
    cost_center: Option<String>,
    #[serde(rename = "Bill Rate", default, deserialize_with = "fields::decimal")]
    bill_rate: Option<f64>,
    #[serde(rename = "Suggested Bill Rate", default, deserialize_with = "fields::decimal")]
    suggested_bill_rate: Option<f64>,
    #[serde(rename = "Max Bill Rate", default, deserialize_with = "fields::decimal")]
    max_bill_rate: Option<f64>,
    #[serde(rename = "Standard Hours Per Week", default, deserialize_with = "fields::text")]
    hours_per_week: Option<String>,
    #[serde(rename = "Shift Time Type", default, deserialize_with = "fields::text")]
    shift_time_type: Option<String>,
    #[serde(rename = "Resource Manager (Job)", default, deserialize_with = "fields::text")]
    resource_manager: Option<String>,
    #[serde(
        rename = "Interviews Performed (for this job)",
        default,
        deserialize_with = "fields::integer"
    )]
    interviews_performed: Option<i64>,
    #[serde(rename = "Open Positions", default, deserialize_with = "fields::integer")]
    open_positions: Option<i64>,
    #[serde(rename = "Reason For Hire", default, deserialize_with = "fields::text")]
    reason_for_hire: Option<String>,
    #[serde(rename = "Start Date", default, deserialize_with = "fields::datetime")]
    start_date: Option<NaiveDateTime>,
    #[serde(rename = "Job Type", default, deserialize_with = "fields::text")]
    job_type: Option<String>,
    #[serde(rename = "Job Status", default, deserialize_with = "fields::text")]
    job_status: Option<String>,
}

impl JobRow {
    fn into_position(self) -> Position {
        let mut position = Position::new(SourceKind::Vndly, &self.job_id);
        position.bill_rate_estimated = self.bill_rate.is_none();
        position.bill_rate = self
            .bill_rate
            .or(self.suggested_bill_rate)
            .or(self.max_bill_rate);
        position.facility = self.facility.or_else(|| self.health_system.clone());
        position.health_system = self.health_system;
        position.program = self.category;
        position.specialty = self.title;
        position.date_added = self.approval_date;
        position.unit = self.organization_unit;
        position.cost_center = self.cost_center;
        position.shift_hours = self.hours_per_week;
        position.shift_time = self.shift_time_type;
        position.hiring_manager = self.resource_manager;
        position.num_submissions_reported = self.interviews_performed;
        position.num_positions = self.open_positions;
        position.requisition_reason = self.reason_for_hire;
        position.start_date = self.start_date;
        position.time_type = self.job_type;
        position.status = self.job_status;
        position
    }
}

/// A VNDLY candidate submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VndlySubmission {
    #[serde(rename = "Job Id", deserialize_with = "fields::required_text")]
    pub job_id: String,
    #[serde(rename = "Full Name", default, deserialize_with = "fields::text")]
    pub full_name: Option<String>,
    #[serde(rename = "Vendor Company Name", default, deserialize_with = "fields::text")]
    pub vendor: Option<String>,
    #[serde(rename = "Application Date", default, deserialize_with = "fields::datetime")]
    pub application_date: Option<NaiveDateTime>,
    #[serde(rename = "Status", default, deserialize_with = "fields::exact_text")]
    pub status: Option<String>,
    #[serde(rename = "Client Interview Date", default, deserialize_with = "fields::datetime")]
    pub interview_date: Option<NaiveDateTime>,
    #[serde(rename = "Client Rejected Date", default, deserialize_with = "fields::datetime")]
    pub client_rejected_date: Option<NaiveDateTime>,
    #[serde(rename = "Rejected Reason - Choice", default, deserialize_with = "fields::text")]
    pub reject_reason_choice: Option<String>,
    #[serde(rename = "Rejected Reason - Text", default, deserialize_with = "fields::text")]
    pub reject_reason_text: Option<String>,
    #[serde(
        rename = "Vendor Offer Declined Date",
        default,
        deserialize_with = "fields::datetime"
    )]
    pub vendor_declined_date: Option<NaiveDateTime>,
    #[serde(rename = "Vendor Withdrawn Date", default, deserialize_with = "fields::datetime")]
    pub vendor_withdrawn_date: Option<NaiveDateTime>,
    #[serde(rename = "Withdrawal Reason - Choice", default, deserialize_with = "fields::text")]
    pub withdrawal_reason_choice: Option<String>,
    #[serde(rename = "Withdrawal Reason - Text", default, deserialize_with = "fields::text")]
    pub withdrawal_reason_text: Option<String>,
    #[serde(rename = "Offer Release Date", default, deserialize_with = "fields::datetime")]
    pub offer_date: Option<NaiveDateTime>,
    #[serde(rename = "Offer Accepted Date", default, deserialize_with = "fields::datetime")]
    pub offer_accepted_date: Option<NaiveDateTime>,
    #[serde(rename = "Ready To Onboard Date", default, deserialize_with = "fields::datetime")]
    pub ready_to_onboard_date: Option<NaiveDateTime>,
}

impl VndlySubmission {
    pub fn position_id(&self) -> &str {
        &self.job_id
    }

    pub fn to_candidate(&self, classification: Classification) -> CandidateSubmission {
        CandidateSubmission {
            name: self
                .full_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            agency: self.vendor.clone().unwrap_or_else(|| "Unknown".to_string()),
            submit_date: self.application_date,
            offer_date: self.offer_date,
            awarded_date: self.offer_accepted_date,
            ready_to_onboard_date: self.ready_to_onboard_date,
            is_declined: classification.is_declined,
            decline_reason: classification.decline_reason,
            hospital_decline_date: self.client_rejected_date,
            agency_decline_date: self.vendor_declined_date,
            agency_retracted_date: self.vendor_withdrawn_date,
            interview_date: self.interview_date,
            is_internal_agency: classification.is_internal_agency,
            is_active: classification.is_active,
            status: self.status.clone(),
        }
    }
}

/// Active VNDLY jobs and their submissions.
#[derive(Debug, Default, Clone, Copy)]
pub struct VndlyNormalizer;

impl VndlyNormalizer {
    /// Jobs outside the active state never become positions. The status must match exactly,
    /// so padded or differently cased values stay closed.
    pub fn is_open(row: &RawRow) -> bool {
        matches!(row.get("Job Status"), Some(Value::String(status)) if status == ACTIVE_JOB_STATUS)
    }
}

impl SourceNormalizer for VndlyNormalizer {
    fn kind(&self) -> SourceKind {
        SourceKind::Vndly
    }

    fn fetch_positions(&self, store: &dyn RowStore) -> Result<Normalized<Position>, SourceError> {
        let rows: Vec<RawRow> = store
            .fetch_all(JOB_TABLE)?
            .into_iter()
            .filter(Self::is_open)
            .collect();
        let decoded = decode_rows::<JobRow>(JOB_TABLE, rows);

        let mut positions: Vec<Position> = decoded
            .items
            .into_iter()
            .map(JobRow::into_position)
            .collect();
        sort_newest_first(&mut positions);

        Ok(Normalized {
            items: positions,
            issues: decoded.issues,
        })
    }

    fn fetch_submissions(
        &self,
        store: &dyn RowStore,
        position_ids: &[String],
    ) -> Result<Normalized<RawSubmission>, SourceError> {
        if position_ids.is_empty() {
            return Ok(Normalized::default());
        }
        let rows = store.fetch_where_in(SUBMISSION_TABLE, "Job Id", position_ids)?;
        let decoded = decode_rows::<VndlySubmission>(SUBMISSION_TABLE, rows);
        Ok(Normalized {
            items: decoded.items.into_iter().map(RawSubmission::Vndly).collect(),
            issues: decoded.issues,
        })
    }
}
