//! Staff table, student timeline and dashboard over stored tracking records

use lpk_transfer::tracking::{staff_row, student_timeline, summarize, CoeStatus, PassportStatus};
use lpk_transfer::{DocumentStage, DocumentTrackingRecord, StatusBucket};
use pretty_assertions::assert_eq;

const STORED: &str = r#"[
    {
        "siswa_id": "siswa-1",
        "nama_siswa": "Ayu Lestari",
        "passport_status": "expired",
        "passport_number": "C7654321",
        "coe_status": "approved",
        "coe_number": "COE-2024-118",
        "visa_status": null
    },
    {
        "siswa_id": "siswa-2",
        "nama_siswa": "Budi Santoso",
        "passport_status": "ready",
        "medical_status": "passed",
        "language_status": "in_progress",
        "language_level": "N4",
        "flight_status": "cancelled"
    }
]"#;

fn stored() -> Vec<DocumentTrackingRecord> {
    serde_json::from_str(STORED).unwrap()
}

#[test]
fn test_example_classification() {
    let records = stored();
    let ayu = &records[0];
    assert_eq!(ayu.passport_status, Some(PassportStatus::Expired));
    assert_eq!(ayu.coe_status, Some(CoeStatus::Approved));
    assert_eq!(ayu.bucket(DocumentStage::Passport), StatusBucket::Failed);
    assert_eq!(ayu.bucket(DocumentStage::Coe), StatusBucket::Done);
    assert_eq!(ayu.bucket(DocumentStage::Visa), StatusBucket::NotStarted);
}

#[test]
fn test_staff_row() {
    let row = staff_row(&stored()[1]);
    assert_eq!(row.nama_siswa.as_deref(), Some("Budi Santoso"));
    let buckets: Vec<StatusBucket> = row.stages.iter().map(|c| c.bucket).collect();
    assert_eq!(
        buckets,
        vec![
            StatusBucket::Done,
            StatusBucket::Done,
            StatusBucket::InProgress,
            StatusBucket::NotStarted,
            StatusBucket::NotStarted,
            StatusBucket::NotStarted,
        ]
    );
    // Unrecognised stored value is shown as written, classified as not started
    assert_eq!(row.stages[5].status.as_deref(), Some("cancelled"));
    assert!((row.percent_complete - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn test_timeline_matches_staff_row() {
    for record in stored() {
        let row = staff_row(&record);
        let timeline = student_timeline(&record);
        assert_eq!(row.stages.len(), timeline.len());
        for (cell, step) in row.stages.iter().zip(&timeline) {
            assert_eq!(cell.bucket, step.bucket, "{} {}", record.siswa_id, step.label);
        }
    }
}

#[test]
fn test_timeline_details() {
    let timeline = student_timeline(&stored()[1]);
    assert_eq!(timeline[2].label, "Sertifikat Bahasa");
    assert_eq!(timeline[2].detail.as_deref(), Some("N4"));
    assert!(timeline[2].current);
}

#[test]
fn test_dashboard_summary() {
    let summary = summarize(&stored());
    assert_eq!(summary.students, 2);
    assert_eq!(summary.completed, 0);
    let passport = summary.per_stage[&DocumentStage::Passport];
    assert_eq!((passport.done, passport.failed), (1, 1));
    assert_eq!(summary.per_stage[&DocumentStage::Flight].not_started, 2);
    assert_eq!(summary.per_stage.len(), 6);
}
