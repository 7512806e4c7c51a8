//! Runs the `lpk` binary end to end in a temporary directory

use std::path::Path;
use std::process::{Command, Output};

fn lpk(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lpk"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const SISWA: &str = r#"[
    {"nik": "3201010101010001", "nama": "Ayu Lestari", "tanggal_lahir": "2001-08-17"},
    {"nik": "3201010101010002", "nama": "Budi Santoso", "sudah_menikah": true}
]"#;

#[test]
fn test_export_then_import_twice() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("siswa.json"), SISWA).unwrap();

    let out = lpk(
        &["export", "--entity", "siswa", "--input", "siswa.json", "--name", "siswa"],
        tmp.path(),
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(tmp.path().join("siswa.xlsx").exists());

    let import = ["import", "siswa.xlsx", "--entity", "siswa", "--store", "db.json"];
    let out = lpk(&import, tmp.path());
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("Berhasil: 2, Gagal: 0"));

    let out = lpk(&import, tmp.path());
    let text = stdout(&out);
    assert!(text.contains("Berhasil: 0, Gagal: 2"));
    assert!(text.contains("NIK 3201010101010001 sudah ada dalam database"));
}

#[test]
fn test_truncated_upload_needs_flag() {
    let tmp = tempfile::tempdir().unwrap();
    let long = "x".repeat(33_000);
    let records = format!(r#"[{{"nik": "1", "nama": "Citra", "alamat": "{long}"}}]"#);
    std::fs::write(tmp.path().join("siswa.json"), records).unwrap();

    let out = lpk(
        &["export", "-e", "siswa", "-i", "siswa.json", "-n", "panjang"],
        tmp.path(),
    );
    assert!(out.status.success());
    assert!(stderr(&out).contains("telah dipotong"));

    let out = lpk(&["import", "panjang.xlsx", "-e", "siswa", "-s", "db.json"], tmp.path());
    assert!(!out.status.success());
    assert!(stderr(&out).contains("--accept-truncated"));
    assert!(!tmp.path().join("db.json").exists());

    let out = lpk(
        &["import", "panjang.xlsx", "-e", "siswa", "-s", "db.json", "--accept-truncated"],
        tmp.path(),
    );
    assert!(out.status.success());
    assert!(stdout(&out).contains("Berhasil: 1"));
}

#[test]
fn test_unsupported_upload() {
    let tmp = tempfile::tempdir().unwrap();
    let out = lpk(&["preview", "siswa.csv", "--entity", "siswa"], tmp.path());
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Unsupported file format"));
}

#[test]
fn test_template_and_tracking() {
    let tmp = tempfile::tempdir().unwrap();
    let out = lpk(&["template", "--entity", "perusahaan"], tmp.path());
    assert!(out.status.success());
    assert!(tmp.path().join("template_perusahaan.xlsx").exists());

    std::fs::write(
        tmp.path().join("tracking.json"),
        r#"[{"siswa_id": "siswa-1", "nama_siswa": "Ayu", "passport_status": "expired", "coe_status": "approved"}]"#,
    )
    .unwrap();
    let out = lpk(&["tracking", "tracking.json"], tmp.path());
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("[x] expired"));
    assert!(text.contains("[v] approved"));

    let out = lpk(&["tracking", "tracking.json", "--timeline", "siswa-1"], tmp.path());
    assert!(stdout(&out).contains("> 1."));
}
