use std::sync::Arc;

use axum::response::Response;
use serde_json::{json, Value};

use crate::store::{InMemoryRowStore, RawRow};
use crate::workflows::positions::{b4, vndly, ReconciliationEngine};

pub(super) fn row(value: Value) -> RawRow {
    match value {
        Value::Object(map) => map,
        _ => panic!("row fixture must be an object"),
    }
}

pub(super) fn rows(values: Vec<Value>) -> Vec<RawRow> {
    values.into_iter().map(row).collect()
}

/// Two B4 orders (one padded id) and two active VNDLY jobs, with submissions spread across
/// internal, external, declined and unmatched cases.
pub(super) fn staffing_store() -> InMemoryRowStore {
    InMemoryRowStore::default()
        .with_table(
            b4::OPEN_ORDER_TABLE,
            rows(vec![
                json!({
                    "Position ID": "AB12 ",
                    "Program": "Epic",
                    "Facility Name": "Mercy West",
                    "Specialty Name": "RN - ICU",
                    "Date Added": "2025-05-02 10:00:00",
                    "Bill Rate": 112.5,
                    "Shift Hours": 12,
                    "# of Submissions": 9,
                    "Number of Positions": 2
                }),
                json!({
                    "Position ID": "CD34",
                    "Facility Name": "Mercy East",
                    "Date Added": "2025-05-06 09:30:00"
                }),
            ]),
        )
        .with_table(
            b4::ORDER_TABLE,
            rows(vec![json!({
                "Contract_ID": "AB12",
                "Time_Type": "Days",
                "Contract_Status": "Open",
                "Health_System": "Mercy"
            })]),
        )
        .with_table(
            b4::SUBMISSION_TABLE,
            rows(vec![
                json!({
                    "Contract_Assignment_ID": " AB12",
                    "Agency_Name": "GHR Staffing",
                    "Professional": "Avery Stone",
                    "Submission_Date": "2025-05-03",
                    "IsActive": 1
                }),
                json!({
                    "Contract_Assignment_ID": "AB12",
                    "Agency_Name": "Aya Healthcare",
                    "Professional": "Blake Ortiz",
                    "Submission_Date": "2025-05-04",
                    "Hospital_Decline_Date": "2025-05-08",
                    "Hospital_Decline_Reason": "Schedule conflict",
                    "Agency_Decline_Date": "2025-05-07",
                    "Offer_Decline_Reason": "Rate"
                }),
                json!({
                    "Contract_Assignment_ID": "AB12",
                    "Agency_Name": "The Planet Group",
                    "Submission_Date": "2025-05-05"
                }),
                json!({
                    "Contract_Assignment_ID": "CD34",
                    "Agency_Name": "Planet Healthcare LLC",
                    "Professional": "Casey Park",
                    "Agency_Retracted_Date": "2025-05-09"
                }),
                json!({
                    "Contract_Assignment_ID": "ZZ99",
                    "Agency_Name": "GHR Staffing",
                    "Professional": "Nobody Matched"
                }),
            ]),
        )
        .with_table(
            vndly::JOB_TABLE,
            rows(vec![
                json!({
                    "Job Id": "V-100",
                    "Job Status": "Active",
                    "Job Category": "Cerner",
                    "Health System": "Lakeside Health",
                    "Job Approval Date": "2025-04-20T08:00:00",
                    "Suggested Bill Rate": 95
                }),
                json!({
                    "Job Id": "V-200",
                    "Job Status": "Closed",
                    "Job Approval Date": "2025-05-20T08:00:00"
                }),
            ]),
        )
        .with_table(
            vndly::SUBMISSION_TABLE,
            rows(vec![
                json!({
                    "Job Id": "V-100 ",
                    "Full Name": "Drew Fox",
                    "Vendor Company Name": "ghr healthcare",
                    "Status": "Active",
                    "Application Date": "2025-04-22"
                }),
                json!({
                    "Job Id": "V-100",
                    "Full Name": "Emery Shaw",
                    "Vendor Company Name": "Aya Healthcare",
                    "Status": "Rejected",
                    "Rejected Reason - Choice": "Experience"
                }),
            ]),
        )
}

pub(super) fn engine_for(store: InMemoryRowStore) -> Arc<ReconciliationEngine> {
    Arc::new(ReconciliationEngine::standard(Arc::new(store)))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
