use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use tower::ServiceExt;

use crate::store::InMemoryRowStore;
use crate::workflows::positions::router::stats_handler;
use crate::workflows::positions::{b4, positions_router, vndly};

#[tokio::test(flavor = "multi_thread")]
async fn positions_route_returns_the_envelope() {
    let router = positions_router(engine_for(staffing_store()));

    let response = router
        .oneshot(
            axum::http::Request::get("/api/positions")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let positions = payload["positions"].as_array().expect("positions array");
    assert_eq!(positions.len(), 3);
    assert_eq!(positions[0]["source_system"], "B4");
    assert_eq!(positions[1]["position_id"], "AB12");
    assert_eq!(positions[1]["ghrSubmissions"], 1);
    assert_eq!(positions[1]["candidates"][0]["isInternalAgency"], true);
    assert_eq!(positions[2]["bill_rate_estimated"], true);
    assert_eq!(payload["errors"], serde_json::json!([]));
    assert_eq!(payload["unmatchedSubmissions"], 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn source_outage_keeps_a_success_status() {
    let router = positions_router(engine_for(
        staffing_store().with_unavailable(vndly::SUBMISSION_TABLE),
    ));

    let response = router
        .oneshot(
            axum::http::Request::get("/api/positions")
                .body(axum::body::Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["positions"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["errors"][0]["source"], "VNDLY");
}

#[tokio::test(flavor = "multi_thread")]
async fn stats_failure_is_a_server_error() {
    let engine = engine_for(InMemoryRowStore::default().with_unavailable(b4::ORDER_TABLE));
    let response = stats_handler(State(engine)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn stats_route_returns_both_lists() {
    let store = InMemoryRowStore::default().with_table(
        b4::ORDER_TABLE,
        rows(vec![serde_json::json!({
            "Agency": "GHR Staffing",
            "Contract_Status": "Closed And Awarded",
            "Start_Date": "2999-01-01"
        })]),
    );
    let response = stats_handler(State(engine_for(store))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["onAssignment"], serde_json::json!([]));
    assert_eq!(payload["upcoming"][0]["agency"], "GHR Staffing");
}
