use super::b4::{OrderRow, ORDER_TABLE};
use super::normalizer::decode_rows;
use crate::store::{value_text, RowStore, SourceError};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{info, warn};

/// Contract status of an order that has been filled.
pub const AWARDED_STATUS: &str = "Closed And Awarded";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub agency: Option<String>,
    pub system: Option<String>,
    pub facility: Option<String>,
    pub specialty: Option<String>,
    pub start_date: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementStats {
    pub on_assignment: Vec<Placement>,
    pub upcoming: Vec<Placement>,
}

/// Splits awarded B4 orders into current assignments and upcoming starts as of `now`.
///
/// Orders without a start date belong to neither list; an on-assignment order also needs
/// an end date.
pub fn placement_stats(
    store: &dyn RowStore,
    now: NaiveDateTime,
) -> Result<PlacementStats, SourceError> {
    let rows = store
        .fetch_all(ORDER_TABLE)?
        .into_iter()
        .filter(|row| {
            row.get("Contract_Status").and_then(value_text).as_deref() == Some(AWARDED_STATUS)
        })
        .collect();
    let decoded = decode_rows::<OrderRow>(ORDER_TABLE, rows);
    for issue in &decoded.issues {
        warn!(error = %issue, "order row skipped");
    }

    let mut on_assignment = Vec::new();
    let mut upcoming = Vec::new();
    for order in decoded.items {
        let Some(start) = order.start_date else {
            continue;
        };
        let placement = |end_date| Placement {
            agency: order.agency.clone(),
            system: order.program.clone(),
            facility: order.facility.clone(),
            specialty: order.position_type.clone(),
            start_date: start,
            end_date,
        };
        if start > now {
            upcoming.push(placement(None));
        } else if let Some(end) = order.end_date.filter(|end| now <= *end) {
            on_assignment.push(placement(Some(end)));
        }
    }

    on_assignment.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    upcoming.sort_by(|a, b| a.start_date.cmp(&b.start_date));

    info!(
        on_assignment = on_assignment.len(),
        upcoming = upcoming.len(),
        "placement stats computed"
    );
    Ok(PlacementStats {
        on_assignment,
        upcoming,
    })
}
