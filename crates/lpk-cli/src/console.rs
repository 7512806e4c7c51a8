//! Terminal rendering of warnings, import results and tracking views

use std::io::{self, Write};

use lpk_transfer::tracking::{StaffTrackingRow, TimelineStep, TrackingSummary};
use lpk_transfer::{DocumentStage, ImportResult, Reporter, StatusBucket, TransferWarning};

/// Writes warnings to stderr and results to stdout
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn warn(&mut self, warning: &TransferWarning) {
        eprintln!("Peringatan: {warning}");
    }

    fn result(&mut self, result: &ImportResult) {
        let mut out = io::stdout().lock();
        let _ = render_result(&mut out, result);
    }
}

pub fn render_result(out: &mut impl Write, result: &ImportResult) -> io::Result<()> {
    writeln!(out, "Berhasil: {}, Gagal: {}", result.success, result.failed)?;
    for error in &result.errors {
        writeln!(out, "  - {error}")?;
    }
    Ok(())
}

fn badge(bucket: StatusBucket) -> &'static str {
    match bucket {
        StatusBucket::Done => "[v]",
        StatusBucket::InProgress => "[~]",
        StatusBucket::Failed => "[x]",
        StatusBucket::NotStarted => "[ ]",
    }
}

pub fn render_staff_table(out: &mut impl Write, rows: &[StaffTrackingRow]) -> io::Result<()> {
    write!(out, "{:<14} {:<24}", "ID", "Nama")?;
    for stage in DocumentStage::ALL {
        write!(out, " {:<12}", short_label(stage))?;
    }
    writeln!(out, " {:>6}", "%")?;

    for row in rows {
        let nama = row.nama_siswa.as_deref().unwrap_or("-");
        write!(out, "{:<14} {:<24}", row.siswa_id, nama)?;
        for cell in &row.stages {
            let status = cell.status.as_deref().unwrap_or("-");
            write!(out, " {} {:<8}", badge(cell.bucket), status)?;
        }
        writeln!(out, " {:>5.0}%", row.percent_complete)?;
    }
    Ok(())
}

fn short_label(stage: DocumentStage) -> &'static str {
    match stage {
        DocumentStage::Passport => "Paspor",
        DocumentStage::MedicalCheck => "MCU",
        DocumentStage::LanguageCertificate => "Bahasa",
        DocumentStage::Coe => "CoE",
        DocumentStage::Visa => "Visa",
        DocumentStage::Flight => "Terbang",
    }
}

pub fn render_timeline(out: &mut impl Write, steps: &[TimelineStep]) -> io::Result<()> {
    for (i, step) in steps.iter().enumerate() {
        let marker = if step.current { ">" } else { " " };
        write!(out, "{marker} {}. {} {:<28} {}", i + 1, badge(step.bucket), step.label, step.bucket)?;
        if let Some(detail) = &step.detail {
            write!(out, " ({detail})")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn render_summary(out: &mut impl Write, summary: &TrackingSummary) -> io::Result<()> {
    writeln!(
        out,
        "Siswa: {}, dokumen lengkap: {}, rata-rata progres: {:.0}%",
        summary.students, summary.completed, summary.average_percent
    )?;
    for (stage, counts) in &summary.per_stage {
        write!(out, "  {:<28}", stage.label())?;
        for bucket in StatusBucket::ALL {
            write!(out, " {}: {:<4}", bucket.label(), counts.get(bucket))?;
        }
        writeln!(out)?;
    }
    Ok(())
}
