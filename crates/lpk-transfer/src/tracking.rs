//! Document tracking: stage statuses and their badge categories.
//!
//! Every student goes through six independent document stages. Each stage
//! stores its own status token; [`classify`] folds any token into one of
//! four [`StatusBucket`]s. The staff table, the student timeline and the
//! dashboard summary all go through that one function.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! stage_status {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            /// Any other stored token, kept as written
            Other(String),
        }

        impl $name {
            /// The stored token
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $token,)+
                    $name::Other(token) => token.as_str(),
                }
            }

            pub fn from_token(token: &str) -> Self {
                match token {
                    $($token => $name::$variant,)+
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let token = String::deserialize(deserializer)?;
                Ok($name::from_token(&token))
            }
        }
    };
}

stage_status!(
    /// Passport application
    PassportStatus {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Ready => "ready",
        Expired => "expired",
    }
);

stage_status!(
    /// Medical check-up
    MedicalStatus {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Passed => "passed",
        Fail => "fail",
    }
);

stage_status!(
    /// Japanese language certificate
    LanguageStatus {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Passed => "passed",
        Fail => "fail",
    }
);

stage_status!(
    /// Certificate of Eligibility
    CoeStatus {
        NotStarted => "not_started",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
    }
);

stage_status!(
    /// Work visa
    VisaStatus {
        NotApplied => "not_applied",
        Applied => "applied",
        Granted => "granted",
        Denied => "denied",
    }
);

stage_status!(
    /// Departure flight
    FlightStatus {
        NotBooked => "not_booked",
        Booked => "booked",
        Departed => "departed",
    }
);

/// Badge category of a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    Done,
    InProgress,
    Failed,
    NotStarted,
}

impl StatusBucket {
    pub const ALL: [StatusBucket; 4] = [
        StatusBucket::Done,
        StatusBucket::InProgress,
        StatusBucket::Failed,
        StatusBucket::NotStarted,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusBucket::Done => "Selesai",
            StatusBucket::InProgress => "Dalam Proses",
            StatusBucket::Failed => "Gagal",
            StatusBucket::NotStarted => "Belum Dimulai",
        }
    }
}

impl fmt::Display for StatusBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bucket of a stored status token. Total: anything unrecognised, and no
/// value at all, is [`StatusBucket::NotStarted`]. Matching is exact.
pub fn classify(status: Option<&str>) -> StatusBucket {
    match status {
        Some("ready" | "done" | "passed" | "approved" | "granted" | "departed") => StatusBucket::Done,
        Some("in_progress" | "submitted" | "applied" | "booked") => StatusBucket::InProgress,
        Some("rejected" | "denied" | "expired" | "fail") => StatusBucket::Failed,
        _ => StatusBucket::NotStarted,
    }
}

/// The six document stages, in process order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStage {
    Passport,
    MedicalCheck,
    LanguageCertificate,
    Coe,
    Visa,
    Flight,
}

impl DocumentStage {
    pub const ALL: [DocumentStage; 6] = [
        DocumentStage::Passport,
        DocumentStage::MedicalCheck,
        DocumentStage::LanguageCertificate,
        DocumentStage::Coe,
        DocumentStage::Visa,
        DocumentStage::Flight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DocumentStage::Passport => "Paspor",
            DocumentStage::MedicalCheck => "Medical Check-up",
            DocumentStage::LanguageCertificate => "Sertifikat Bahasa",
            DocumentStage::Coe => "Certificate of Eligibility",
            DocumentStage::Visa => "Visa",
            DocumentStage::Flight => "Penerbangan",
        }
    }
}

impl fmt::Display for DocumentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Document progress of one student
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTrackingRecord {
    pub siswa_id: String,
    #[serde(default)]
    pub nama_siswa: Option<String>,

    pub passport_status: Option<PassportStatus>,
    pub passport_number: Option<String>,
    pub passport_expiry: Option<NaiveDate>,

    pub medical_status: Option<MedicalStatus>,
    pub medical_check_date: Option<NaiveDate>,

    pub language_status: Option<LanguageStatus>,
    /// Certificate level, e.g. `N4` or `JFT-Basic A2`
    pub language_level: Option<String>,
    pub language_certificate_number: Option<String>,

    pub coe_status: Option<CoeStatus>,
    pub coe_number: Option<String>,
    pub coe_issue_date: Option<NaiveDate>,

    pub visa_status: Option<VisaStatus>,
    pub visa_number: Option<String>,

    pub flight_status: Option<FlightStatus>,
    pub flight_date: Option<NaiveDate>,
    pub flight_number: Option<String>,

    pub notes: Option<String>,
}

impl DocumentTrackingRecord {
    pub fn new(siswa_id: impl Into<String>) -> Self {
        Self {
            siswa_id: siswa_id.into(),
            ..Self::default()
        }
    }

    /// Stored token of one stage, exactly as staff set it
    pub fn status(&self, stage: DocumentStage) -> Option<&str> {
        match stage {
            DocumentStage::Passport => self.passport_status.as_ref().map(PassportStatus::as_str),
            DocumentStage::MedicalCheck => self.medical_status.as_ref().map(MedicalStatus::as_str),
            DocumentStage::LanguageCertificate => {
                self.language_status.as_ref().map(LanguageStatus::as_str)
            }
            DocumentStage::Coe => self.coe_status.as_ref().map(CoeStatus::as_str),
            DocumentStage::Visa => self.visa_status.as_ref().map(VisaStatus::as_str),
            DocumentStage::Flight => self.flight_status.as_ref().map(FlightStatus::as_str),
        }
    }

    pub fn bucket(&self, stage: DocumentStage) -> StatusBucket {
        classify(self.status(stage))
    }

    /// Share of stages that are done, 0 to 100
    pub fn percent_complete(&self) -> f64 {
        let done = DocumentStage::ALL
            .iter()
            .filter(|s| self.bucket(**s) == StatusBucket::Done)
            .count();
        done as f64 / DocumentStage::ALL.len() as f64 * 100.0
    }

    /// Human-readable metadata of one stage, when any is recorded
    pub fn detail(&self, stage: DocumentStage) -> Option<String> {
        let parts: Vec<String> = match stage {
            DocumentStage::Passport => vec![
                self.passport_number.clone(),
                self.passport_expiry.map(|d| format!("berlaku s/d {}", d.format("%d/%m/%Y"))),
            ],
            DocumentStage::MedicalCheck => {
                vec![self.medical_check_date.map(|d| format!("tanggal {}", d.format("%d/%m/%Y")))]
            }
            DocumentStage::LanguageCertificate => vec![
                self.language_level.clone(),
                self.language_certificate_number.clone(),
            ],
            DocumentStage::Coe => vec![
                self.coe_number.clone(),
                self.coe_issue_date.map(|d| format!("terbit {}", d.format("%d/%m/%Y"))),
            ],
            DocumentStage::Visa => vec![self.visa_number.clone()],
            DocumentStage::Flight => vec![
                self.flight_number.clone(),
                self.flight_date.map(|d| d.format("%d/%m/%Y").to_string()),
            ],
        }
        .into_iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

// ==================== Views ====================

/// One cell of the staff table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCell {
    pub stage: DocumentStage,
    /// Stored token, as staff set it
    pub status: Option<String>,
    pub bucket: StatusBucket,
}

/// One row of the staff-facing tracking table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffTrackingRow {
    pub siswa_id: String,
    pub nama_siswa: Option<String>,
    /// One cell per stage, in process order
    pub stages: Vec<StageCell>,
    pub percent_complete: f64,
}

pub fn staff_row(record: &DocumentTrackingRecord) -> StaffTrackingRow {
    StaffTrackingRow {
        siswa_id: record.siswa_id.clone(),
        nama_siswa: record.nama_siswa.clone(),
        stages: DocumentStage::ALL
            .iter()
            .map(|&stage| StageCell {
                stage,
                status: record.status(stage).map(str::to_string),
                bucket: record.bucket(stage),
            })
            .collect(),
        percent_complete: record.percent_complete(),
    }
}

/// One step of the student-facing timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineStep {
    pub stage: DocumentStage,
    pub label: &'static str,
    pub bucket: StatusBucket,
    pub detail: Option<String>,
    /// The first step that is not done yet
    pub current: bool,
}

pub fn student_timeline(record: &DocumentTrackingRecord) -> Vec<TimelineStep> {
    let mut current_seen = false;
    DocumentStage::ALL
        .iter()
        .map(|&stage| {
            let bucket = record.bucket(stage);
            let current = !current_seen && bucket != StatusBucket::Done;
            current_seen |= current;
            TimelineStep {
                stage,
                label: stage.label(),
                bucket,
                detail: record.detail(stage),
                current,
            }
        })
        .collect()
}

// ==================== Summary ====================

/// Number of students per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketCounts {
    pub done: usize,
    pub in_progress: usize,
    pub failed: usize,
    pub not_started: usize,
}

impl BucketCounts {
    fn add(&mut self, bucket: StatusBucket) {
        match bucket {
            StatusBucket::Done => self.done += 1,
            StatusBucket::InProgress => self.in_progress += 1,
            StatusBucket::Failed => self.failed += 1,
            StatusBucket::NotStarted => self.not_started += 1,
        }
    }

    pub fn get(&self, bucket: StatusBucket) -> usize {
        match bucket {
            StatusBucket::Done => self.done,
            StatusBucket::InProgress => self.in_progress,
            StatusBucket::Failed => self.failed,
            StatusBucket::NotStarted => self.not_started,
        }
    }

    pub fn total(&self) -> usize {
        self.done + self.in_progress + self.failed + self.not_started
    }
}

/// Dashboard aggregate over many students
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackingSummary {
    pub students: usize,
    pub per_stage: BTreeMap<DocumentStage, BucketCounts>,
    /// Students with every stage done
    pub completed: usize,
    /// Mean of the students' completion percentages
    pub average_percent: f64,
}

pub fn summarize(records: &[DocumentTrackingRecord]) -> TrackingSummary {
    let mut summary = TrackingSummary {
        students: records.len(),
        ..TrackingSummary::default()
    };
    let mut percent_sum = 0.0;

    for record in records {
        for stage in DocumentStage::ALL {
            summary
                .per_stage
                .entry(stage)
                .or_default()
                .add(record.bucket(stage));
        }
        let percent = record.percent_complete();
        if percent >= 100.0 {
            summary.completed += 1;
        }
        percent_sum += percent;
    }

    if !records.is_empty() {
        summary.average_percent = percent_sum / records.len() as f64;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_classify_table() {
        for done in ["ready", "done", "passed", "approved", "granted", "departed"] {
            assert_eq!(classify(Some(done)), StatusBucket::Done, "{done}");
        }
        for busy in ["in_progress", "submitted", "applied", "booked"] {
            assert_eq!(classify(Some(busy)), StatusBucket::InProgress, "{busy}");
        }
        for bad in ["rejected", "denied", "expired", "fail"] {
            assert_eq!(classify(Some(bad)), StatusBucket::Failed, "{bad}");
        }
        for other in ["not_started", "not_applied", "not_booked", "unknown", "Approved", ""] {
            assert_eq!(classify(Some(other)), StatusBucket::NotStarted, "{other}");
        }
        assert_eq!(classify(None), StatusBucket::NotStarted);
    }

    #[test]
    fn test_unknown_stored_value() {
        let record: DocumentTrackingRecord = serde_json::from_str(
            r#"{"siswa_id": "s1", "visa_status": "on_hold", "coe_status": "approved"}"#,
        )
        .unwrap();
        assert_eq!(record.visa_status, Some(VisaStatus::Other("on_hold".into())));
        assert_eq!(record.status(DocumentStage::Visa), Some("on_hold"));
        assert_eq!(record.bucket(DocumentStage::Visa), StatusBucket::NotStarted);
        assert_eq!(record.bucket(DocumentStage::Coe), StatusBucket::Done);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["visa_status"], "on_hold");
    }

    #[test]
    fn test_tokens_outside_a_stage_list_still_classify() {
        let record: DocumentTrackingRecord = serde_json::from_str(
            r#"{"siswa_id": "s1", "passport_status": "done", "visa_status": "approved", "flight_status": "expired"}"#,
        )
        .unwrap();
        assert_eq!(record.bucket(DocumentStage::Passport), StatusBucket::Done);
        assert_eq!(record.bucket(DocumentStage::Visa), StatusBucket::Done);
        assert_eq!(record.bucket(DocumentStage::Flight), StatusBucket::Failed);

        let row = staff_row(&record);
        assert_eq!(row.stages[0].status.as_deref(), Some("done"));
        assert_eq!(row.stages[4].bucket, StatusBucket::Done);
        assert_eq!(student_timeline(&record)[5].bucket, StatusBucket::Failed);
        let summary = summarize(&[record]);
        assert_eq!(summary.per_stage[&DocumentStage::Flight].failed, 1);
    }

    #[test]
    fn test_percent_complete() {
        let mut record = DocumentTrackingRecord::new("s1");
        assert_eq!(record.percent_complete(), 0.0);
        record.passport_status = Some(PassportStatus::Ready);
        record.medical_status = Some(MedicalStatus::Passed);
        record.language_status = Some(LanguageStatus::Fail);
        assert!((record.percent_complete() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_timeline_marks_first_open_step() {
        let mut record = DocumentTrackingRecord::new("s1");
        record.passport_status = Some(PassportStatus::Ready);
        record.passport_number = Some("C1234567".into());
        record.passport_expiry = NaiveDate::from_ymd_opt(2030, 1, 31);
        record.medical_status = Some(MedicalStatus::InProgress);

        let timeline = student_timeline(&record);
        assert_eq!(timeline.len(), 6);
        assert_eq!(timeline[0].detail.as_deref(), Some("C1234567, berlaku s/d 31/01/2030"));
        assert!(!timeline[0].current);
        assert!(timeline[1].current);
        assert_eq!(timeline.iter().filter(|s| s.current).count(), 1);
    }

    #[test]
    fn test_views_agree() {
        let mut record = DocumentTrackingRecord::new("s1");
        record.coe_status = Some(CoeStatus::Rejected);
        record.flight_status = Some(FlightStatus::Booked);
        let row = staff_row(&record);
        let timeline = student_timeline(&record);
        for (cell, step) in row.stages.iter().zip(&timeline) {
            assert_eq!(cell.stage, step.stage);
            assert_eq!(cell.bucket, step.bucket);
        }
    }

    #[test]
    fn test_summarize() {
        let mut a = DocumentTrackingRecord::new("a");
        a.passport_status = Some(PassportStatus::Expired);
        let mut b = DocumentTrackingRecord::new("b");
        b.passport_status = Some(PassportStatus::Ready);
        b.medical_status = Some(MedicalStatus::Passed);
        b.language_status = Some(LanguageStatus::Passed);
        b.coe_status = Some(CoeStatus::Approved);
        b.visa_status = Some(VisaStatus::Granted);
        b.flight_status = Some(FlightStatus::Departed);

        let summary = summarize(&[a, b]);
        assert_eq!(summary.students, 2);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.average_percent, 50.0);
        let passport = summary.per_stage[&DocumentStage::Passport];
        assert_eq!(passport, BucketCounts { done: 1, in_progress: 0, failed: 1, not_started: 0 });
        assert_eq!(summary.per_stage[&DocumentStage::Visa].not_started, 1);
        assert!(summary.per_stage.values().all(|c| c.total() == 2));
    }
}
