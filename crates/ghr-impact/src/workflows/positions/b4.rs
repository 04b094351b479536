use super::classifier::Classification;
use super::domain::{CandidateSubmission, Position, SourceKind};
use super::fields;
use super::normalizer::{
    decode_rows, sort_newest_first, unique_ids, Normalized, RawSubmission, SourceNormalizer,
};
use crate::store::{RowStore, SourceError};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::HashMap;

pub const OPEN_ORDER_TABLE: &str = "B4HEALTHOPENORDER";
pub const ORDER_TABLE: &str = "B4HealthOrder";
pub const SUBMISSION_TABLE: &str = "B4Health_Contract_Submissions";

#[derive(Debug, Deserialize)]
struct OpenOrderRow {
    #[serde(rename = "Position ID", deserialize_with = "fields::required_text")]
    position_id: String,
    #[serde(rename = "Program", default, deserialize_with = "fields::text")]
    program: Option<String>,
    #[serde(rename = "Facility Name", default, deserialize_with = "fields::text")]
    facility: Option<String>,
    #[serde(rename = "Specialty Name", default, deserialize_with = "fields::text")]
    specialty: Option<String>,
    #[serde(rename = "Date Added", default, deserialize_with = "fields::datetime")]
    date_added: Option<NaiveDateTime>,
    #[serde(rename = "Unit Name", default, deserialize_with = "fields::text")]
    unit: Option<String>,
    #[serde(rename = "Cost Center", default, deserialize_with = "fields::text")]
    cost_center: Option<String>,
    #[serde(rename = "Bill Rate", default, deserialize_with = "fields::decimal")]
    bill_rate: Option<f64>,
    #[serde(rename = "Shift Hours", default, deserialize_with = "fields::text")]
    shift_hours: Option<String>,
    #[serde(rename = "Shift Time", default, deserialize_with = "fields::text")]
    shift_time: Option<String>,
    #[serde(rename = "Hiring Manager", default, deserialize_with = "fields::text")]
    hiring_manager: Option<String>,
    #[serde(rename = "# of Submissions", default, deserialize_with = "fields::integer")]
    num_submissions: Option<i64>,
    #[serde(rename = "Number of Positions", default, deserialize_with = "fields::integer")]
    num_positions: Option<i64>,
    #[serde(rename = "Requisition_Reason", default, deserialize_with = "fields::text")]
    requisition_reason: Option<String>,
    #[serde(rename = "Shift Diff", default, deserialize_with = "fields::text")]
    shift_diff: Option<String>,
    #[serde(rename = "Min Hours", default, deserialize_with = "fields::text")]
    min_hours: Option<String>,
    #[serde(rename = "Start Date", default, deserialize_with = "fields::datetime")]
    start_date: Option<NaiveDateTime>,
}

/// The order-table columns joined onto an open order. Date columns are not read, so a bad
/// date cell cannot drop the contract details.
#[derive(Debug, Clone, Deserialize)]
struct OrderJoinRow {
    #[serde(rename = "Contract_ID", default, deserialize_with = "fields::text")]
    contract_id: Option<String>,
    #[serde(rename = "Time_Type", default, deserialize_with = "fields::text")]
    time_type: Option<String>,
    #[serde(rename = "Start_Time", default, deserialize_with = "fields::text")]
    start_time: Option<String>,
    #[serde(rename = "End_Time", default, deserialize_with = "fields::text")]
    end_time: Option<String>,
    #[serde(rename = "Contract_Status", default, deserialize_with = "fields::text")]
    contract_status: Option<String>,
    #[serde(rename = "Health_System", default, deserialize_with = "fields::text")]
    health_system: Option<String>,
}

/// An order read on its own for placement stats.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OrderRow {
    #[serde(rename = "Agency", default, deserialize_with = "fields::text")]
    pub agency: Option<String>,
    #[serde(rename = "Program", default, deserialize_with = "fields::text")]
    pub program: Option<String>,
    #[serde(rename = "Facility", default, deserialize_with = "fields::text")]
    pub facility: Option<String>,
    #[serde(rename = "Position_Type", default, deserialize_with = "fields::text")]
    pub position_type: Option<String>,
    #[serde(rename = "Start_Date", default, deserialize_with = "fields::datetime")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(rename = "End_Date", default, deserialize_with = "fields::datetime")]
    pub end_date: Option<NaiveDateTime>,
}

/// A B4 contract submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct B4Submission {
    #[serde(rename = "Contract_Assignment_ID", deserialize_with = "fields::required_text")]
    pub contract_assignment_id: String,
    #[serde(rename = "Agency_Name", default, deserialize_with = "fields::text")]
    pub agency_name: Option<String>,
    #[serde(rename = "Professional", default, deserialize_with = "fields::text")]
    pub professional: Option<String>,
    #[serde(rename = "Submission_Date", default, deserialize_with = "fields::datetime")]
    pub submission_date: Option<NaiveDateTime>,
    #[serde(rename = "Agency_Retracted_Date", default, deserialize_with = "fields::datetime")]
    pub agency_retracted_date: Option<NaiveDateTime>,
    #[serde(rename = "Hospital_Decline_Date", default, deserialize_with = "fields::datetime")]
    pub hospital_decline_date: Option<NaiveDateTime>,
    #[serde(rename = "Hospital_Decline_Reason", default, deserialize_with = "fields::text")]
    pub hospital_decline_reason: Option<String>,
    #[serde(rename = "Offer_Date", default, deserialize_with = "fields::datetime")]
    pub offer_date: Option<NaiveDateTime>,
    #[serde(rename = "Agency_Decline_Date", default, deserialize_with = "fields::datetime")]
    pub agency_decline_date: Option<NaiveDateTime>,
    #[serde(rename = "Offer_Decline_Reason", default, deserialize_with = "fields::text")]
    pub offer_decline_reason: Option<String>,
    #[serde(rename = "Date_Awarded", default, deserialize_with = "fields::datetime")]
    pub date_awarded: Option<NaiveDateTime>,
    #[serde(rename = "RTO", default, deserialize_with = "fields::datetime")]
    pub rto: Option<NaiveDateTime>,
    #[serde(rename = "IsActive", default, deserialize_with = "fields::flag")]
    pub is_active: Option<bool>,
}

impl B4Submission {
    pub fn position_id(&self) -> &str {
        &self.contract_assignment_id
    }

    pub fn to_candidate(&self, classification: Classification) -> CandidateSubmission {
        CandidateSubmission {
            name: self
                .professional
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            agency: self
                .agency_name
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            submit_date: self.submission_date,
            offer_date: self.offer_date,
            awarded_date: self.date_awarded,
            ready_to_onboard_date: self.rto,
            is_declined: classification.is_declined,
            decline_reason: classification.decline_reason,
            hospital_decline_date: self.hospital_decline_date,
            agency_decline_date: self.agency_decline_date,
            agency_retracted_date: self.agency_retracted_date,
            interview_date: None,
            is_internal_agency: classification.is_internal_agency,
            is_active: classification.is_active,
            status: None,
        }
    }
}

/// Open orders left-joined onto the order table by contract id.
#[derive(Debug, Default, Clone, Copy)]
pub struct B4Normalizer;

impl B4Normalizer {
    fn position(open: OpenOrderRow, order: Option<&OrderJoinRow>) -> Position {
        let mut position = Position::new(SourceKind::B4, &open.position_id);
        position.program = open.program;
        position.facility = open.facility;
        position.specialty = open.specialty;
        position.unit = open.unit;
        position.cost_center = open.cost_center;
        position.bill_rate = open.bill_rate;
        position.shift_time = open.shift_time;
        position.time_type = order
            .and_then(|order| order.time_type.clone())
            .or_else(|| open.shift_hours.clone());
        position.shift_hours = open.shift_hours;
        position.hiring_manager = open.hiring_manager;
        position.requisition_reason = open.requisition_reason;
        position.num_submissions_reported = open.num_submissions;
        position.num_positions = open.num_positions;
        position.date_added = open.date_added;
        position.start_date = open.start_date;
        position.shift_diff = open.shift_diff;
        position.min_hours = open.min_hours;
        if let Some(order) = order {
            position.start_time = order.start_time.clone();
            position.end_time = order.end_time.clone();
            position.status = order.contract_status.clone();
            position.health_system = order.health_system.clone();
        }
        position
    }
}

impl SourceNormalizer for B4Normalizer {
    fn kind(&self) -> SourceKind {
        SourceKind::B4
    }

    fn fetch_positions(&self, store: &dyn RowStore) -> Result<Normalized<Position>, SourceError> {
        let Normalized {
            items: open_orders,
            mut issues,
        } = decode_rows::<OpenOrderRow>(OPEN_ORDER_TABLE, store.fetch_all(OPEN_ORDER_TABLE)?);

        let ids = unique_ids(open_orders.iter().map(|open| open.position_id.as_str()));

        let mut orders: HashMap<String, OrderJoinRow> = HashMap::new();
        if !ids.is_empty() {
            let decoded = decode_rows::<OrderJoinRow>(
                ORDER_TABLE,
                store.fetch_where_in(ORDER_TABLE, "Contract_ID", &ids)?,
            );
            issues.extend(decoded.issues);
            for order in decoded.items {
                if let Some(contract_id) = order.contract_id.clone() {
                    orders.entry(contract_id).or_insert(order);
                }
            }
        }

        let mut positions: Vec<Position> = open_orders
            .into_iter()
            .map(|open| {
                let order = orders.get(&open.position_id);
                Self::position(open, order)
            })
            .collect();
        sort_newest_first(&mut positions);

        Ok(Normalized {
            items: positions,
            issues,
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
        let rows = store.fetch_where_in(SUBMISSION_TABLE, "Contract_Assignment_ID", position_ids)?;
        let decoded = decode_rows::<B4Submission>(SUBMISSION_TABLE, rows);
        Ok(Normalized {
            items: decoded.items.into_iter().map(RawSubmission::B4).collect(),
            issues: decoded.issues,
        })
    }
}
