//! Submission classification: declined or not, internal agency or not, active or not.

use super::b4::B4Submission;
use super::normalizer::RawSubmission;
use super::vndly::VndlySubmission;

/// Agency names containing one of these (case-insensitive) are the internal brand.
/// "The Planet Group" is an unrelated vendor, so bare "planet" is not a token.
pub const INTERNAL_AGENCY_TOKENS: [&str; 2] = ["ghr", "planet healthcare"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_declined: bool,
    pub decline_reason: Option<String>,
    pub is_internal_agency: bool,
    pub is_active: bool,
}

pub fn is_internal_agency(agency: Option<&str>) -> bool {
    let agency = agency.unwrap_or_default().to_lowercase();
    INTERNAL_AGENCY_TOKENS
        .iter()
        .any(|token| agency.contains(token))
}

pub fn classify(submission: &RawSubmission) -> Classification {
    match submission {
        RawSubmission::B4(row) => classify_b4(row),
        RawSubmission::Vndly(row) => classify_vndly(row),
    }
}

fn classify_b4(row: &B4Submission) -> Classification {
    let decline_reason = if row.hospital_decline_date.is_some() {
        Some(or_default(&row.hospital_decline_reason, "Hospital Declined"))
    } else if row.agency_decline_date.is_some() {
        Some(or_default(&row.offer_decline_reason, "Agency Declined"))
    } else if row.agency_retracted_date.is_some() {
        Some("Agency Retracted".to_string())
    } else {
        None
    };

    Classification {
        is_declined: decline_reason.is_some(),
        decline_reason,
        is_internal_agency: is_internal_agency(row.agency_name.as_deref()),
        is_active: row.is_active.unwrap_or(false),
    }
}

/// A declined status ("rejected", "offer declined", "job closed") always yields a reason,
/// so declined and reason-present coincide.
fn classify_vndly(row: &VndlySubmission) -> Classification {
    let status = row.status.as_deref().unwrap_or_default().trim().to_lowercase();

    let decline_reason = if row.client_rejected_date.is_some() || status == "rejected" {
        Some(
            row.reject_reason_choice
                .clone()
                .or_else(|| row.reject_reason_text.clone())
                .unwrap_or_else(|| "Client Rejected".to_string()),
        )
    } else if row.vendor_declined_date.is_some() || status == "offer declined" {
        Some("Vendor Declined Offer".to_string())
    } else if row.vendor_withdrawn_date.is_some() {
        Some(
            row.withdrawal_reason_choice
                .clone()
                .or_else(|| row.withdrawal_reason_text.clone())
                .unwrap_or_else(|| "Vendor Withdrawn".to_string()),
        )
    } else if status == "job closed" {
        Some("Job Closed".to_string())
    } else {
        None
    };

    Classification {
        is_declined: decline_reason.is_some(),
        decline_reason,
        is_internal_agency: is_internal_agency(row.vendor.as_deref()),
        is_active: row.status.as_deref() == Some("Active"),
    }
}

fn or_default(reason: &Option<String>, fallback: &str) -> String {
    reason.clone().unwrap_or_else(|| fallback.to_string())
}
