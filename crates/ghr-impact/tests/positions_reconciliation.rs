use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use ghr_impact::store::{CsvRowStore, SqliteRowStore};
use ghr_impact::workflows::positions::{
    b4, placement_stats, vndly, ReconciliationEngine, SourceKind,
};
use rusqlite::Connection;

const B4_SCHEMA: &str = r##"
CREATE TABLE "B4HEALTHOPENORDER" (
    "Position ID" TEXT, "Program" TEXT, "Facility Name" TEXT, "Specialty Name" TEXT,
    "Date Added" TEXT, "Bill Rate" REAL, "Shift Hours" INTEGER, "# of Submissions" INTEGER
);
CREATE TABLE "B4HealthOrder" (
    "Contract_ID" TEXT, "Time_Type" TEXT, "Contract_Status" TEXT, "Health_System" TEXT,
    "Agency" TEXT, "Program" TEXT, "Facility" TEXT, "Position_Type" TEXT,
    "Start_Date" TEXT, "End_Date" TEXT
);
CREATE TABLE "B4Health_Contract_Submissions" (
    "Contract_Assignment_ID" TEXT, "Agency_Name" TEXT, "Professional" TEXT,
    "Submission_Date" TEXT, "Hospital_Decline_Date" TEXT, "Hospital_Decline_Reason" TEXT,
    "IsActive" INTEGER
);
INSERT INTO "B4HEALTHOPENORDER" VALUES
    ('AB12 ', 'Epic', 'Mercy West', 'RN - ICU', '2025-05-02 10:00:00', 112.5, 12, 4),
    ('CD34', 'Cerner', 'Mercy East', 'RN - ED', '2025-05-06 09:30:00', NULL, NULL, NULL);
INSERT INTO "B4HealthOrder" VALUES
    ('AB12', 'Nights', 'Open', 'Mercy', NULL, NULL, NULL, NULL, NULL, NULL),
    ('EF56', NULL, 'Closed And Awarded', 'Mercy', 'GHR', 'Epic', 'Mercy West', 'Analyst',
        '2025-01-06 07:00:00', '2025-04-06 19:00:00'),
    ('GH78', NULL, 'Closed And Awarded', 'Mercy', 'GHR', 'Epic', 'Mercy East', 'Trainer',
        '2025-06-02 07:00:00', NULL);
INSERT INTO "B4Health_Contract_Submissions" VALUES
    ('AB12', 'GHR Staffing', 'Avery Stone', '2025-05-03', NULL, NULL, 1),
    (' AB12', 'Aya Healthcare', 'Blake Ortiz', '2025-05-04', '2025-05-08', 'Schedule conflict', 0),
    ('CD34', 'Planet Healthcare LLC', 'Casey Park', '2025-05-07', NULL, NULL, 1);
"##;

const VNDLY_SCHEMA: &str = r#"
CREATE TABLE "STAGING_VNDLY_JOBS" (
    "Job Id" TEXT, "Job Status" TEXT, "Job Category" TEXT, "Health System" TEXT,
    "Job Approval Date" TEXT, "Bill Rate" REAL
);
CREATE TABLE "STAGING_VNDLY_SUBMISSIONS" (
    "Job Id" TEXT, "Full Name" TEXT, "Vendor Company Name" TEXT, "Status" TEXT,
    "Application Date" TEXT
);
INSERT INTO "STAGING_VNDLY_JOBS" VALUES
    ('V-100', 'Active', 'Cerner', 'Lakeside Health', '2025-04-20T08:00:00', 88.0),
    ('V-200', 'Filled', 'Epic', 'Lakeside Health', '2025-04-21T08:00:00', 90.0);
INSERT INTO "STAGING_VNDLY_SUBMISSIONS" VALUES
    ('V-100', 'Drew Fox', 'GHR Healthcare', 'Active', '2025-04-22'),
    ('V-200', 'Emery Shaw', 'Aya Healthcare', 'Active', '2025-04-23');
"#;

fn seed_database(path: &Path, with_vndly: bool) {
    let conn = Connection::open(path).expect("create positions database");
    conn.execute_batch(B4_SCHEMA).expect("seed b4 tables");
    if with_vndly {
        conn.execute_batch(VNDLY_SCHEMA).expect("seed vndly tables");
    }
}

#[test]
fn sqlite_store_reconciles_both_sources() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = dir.path().join("positions.db");
    seed_database(&db, true);

    let engine = ReconciliationEngine::standard(Arc::new(SqliteRowStore::new(&db)));
    let report = engine.run();

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    let ids: Vec<_> = report
        .positions
        .iter()
        .map(|p| (p.source_system, p.position_id.as_str()))
        .collect();
    assert_eq!(
        ids,
        vec![
            (SourceKind::B4, "CD34"),
            (SourceKind::B4, "AB12"),
            (SourceKind::Vndly, "V-100"),
        ]
    );

    let ab12 = &report.positions[1];
    assert_eq!(ab12.time_type.as_deref(), Some("Nights"));
    assert_eq!(ab12.bill_rate, Some(112.5));
    assert_eq!(ab12.num_submissions_reported, Some(4));
    assert_eq!(ab12.counts().ghr_submissions, 1);
    assert_eq!(ab12.counts().external_declines, 1);

    let cd34 = &report.positions[0];
    assert_eq!(cd34.counts().ghr_submissions, 1);
    assert!(cd34.candidates()[0].is_internal_agency);

    let v100 = &report.positions[2];
    assert_eq!(v100.bill_rate, Some(88.0));
    assert!(!v100.bill_rate_estimated);
    assert_eq!(v100.candidates().len(), 1);
    assert_eq!(v100.counts().ghr_submissions, 1);
}

#[test]
fn missing_vndly_tables_degrade_to_b4_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = dir.path().join("positions.db");
    seed_database(&db, false);

    let report = ReconciliationEngine::standard(Arc::new(SqliteRowStore::new(&db))).run();

    assert_eq!(report.count_for(SourceKind::B4), 2);
    assert_eq!(report.count_for(SourceKind::Vndly), 0);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].source, SourceKind::Vndly);
}

#[test]
fn missing_database_reports_both_sources() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = dir.path().join("absent.db");

    let report = ReconciliationEngine::standard(Arc::new(SqliteRowStore::new(&db))).run();

    assert!(report.positions.is_empty());
    let sources: Vec<_> = report.errors.iter().map(|issue| issue.source).collect();
    assert_eq!(sources, vec![SourceKind::B4, SourceKind::Vndly]);
}

#[test]
fn awarded_orders_split_into_assignments_and_upcoming_starts() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db = dir.path().join("positions.db");
    seed_database(&db, false);

    let now = NaiveDate::from_ymd_opt(2025, 3, 1)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .expect("valid date");
    let stats = placement_stats(&SqliteRowStore::new(&db), now).expect("stats");

    assert_eq!(stats.on_assignment.len(), 1);
    assert_eq!(stats.on_assignment[0].specialty.as_deref(), Some("Analyst"));
    assert_eq!(stats.upcoming.len(), 1);
    assert_eq!(stats.upcoming[0].facility.as_deref(), Some("Mercy East"));
    assert_eq!(stats.upcoming[0].end_date, None);
}

fn write_table(dir: &Path, table: &str, contents: &str) {
    fs::write(dir.join(format!("{table}.csv")), contents).expect("write csv export");
}

#[test]
fn csv_exports_feed_the_same_engine() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_table(
        dir.path(),
        b4::OPEN_ORDER_TABLE,
        "Position ID,Facility Name,Date Added,Bill Rate\nAB12,Mercy West,2025-05-02,\"$1,050.00\"\n",
    );
    write_table(dir.path(), b4::ORDER_TABLE, "Contract_ID,Time_Type\nAB12,Days\n");
    write_table(
        dir.path(),
        b4::SUBMISSION_TABLE,
        "Contract_Assignment_ID,Agency_Name,Professional\nAB12 ,Aya Healthcare,Blake Ortiz\n",
    );
    write_table(
        dir.path(),
        vndly::JOB_TABLE,
        "Job Id,Job Status,Health System\nV-100,Active,Lakeside Health\n",
    );
    write_table(
        dir.path(),
        vndly::SUBMISSION_TABLE,
        "Job Id,Full Name,Vendor Company Name,Status\n",
    );

    let report = ReconciliationEngine::standard(Arc::new(CsvRowStore::new(dir.path()))).run();

    assert!(report.errors.is_empty(), "unexpected errors: {:?}", report.errors);
    assert_eq!(report.count_for(SourceKind::B4), 1);
    assert_eq!(report.count_for(SourceKind::Vndly), 1);
    let ab12 = &report.positions[0];
    assert_eq!(ab12.bill_rate, Some(1050.0));
    assert_eq!(ab12.time_type.as_deref(), Some("Days"));
    assert_eq!(ab12.counts().external_submissions, 1);
    assert!(report.positions[1].candidates().is_empty());
}
