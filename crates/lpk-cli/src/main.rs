//! LPK CLI - spreadsheet import/export and document tracking

mod console;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use lpk_transfer::prelude::*;
use lpk_transfer::tracking::{staff_row, student_timeline, summarize};
use lpk_transfer::dated_stem;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use crate::console::{render_staff_table, render_summary, render_timeline, ConsoleReporter};

#[derive(Parser)]
#[command(name = "lpk")]
#[command(
    author,
    version,
    about = "Import, export and track LPK data in spreadsheets"
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Settings file plus per-value overrides
#[derive(Args, Debug, Default)]
struct SettingsArgs {
    /// JSON settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worksheet name for exports and templates
    #[arg(long, global = true)]
    sheet_name: Option<String>,

    /// Column width for exports and templates
    #[arg(long, global = true)]
    column_width: Option<f64>,

    /// Largest accepted upload, in bytes
    #[arg(long, global = true)]
    max_upload_bytes: Option<u64>,
}

impl SettingsArgs {
    fn resolve(&self) -> Result<TransferSettings> {
        let mut settings = match &self.config {
            Some(path) => TransferSettings::load(path)
                .with_context(|| format!("Failed to load settings from '{}'", path.display()))?,
            None => TransferSettings::default(),
        };
        if let Some(name) = &self.sheet_name {
            settings.sheet_name = name.clone();
        }
        if let Some(width) = self.column_width {
            settings.column_width = width;
        }
        if let Some(bytes) = self.max_upload_bytes {
            settings.max_upload_bytes = bytes;
        }
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export records from a JSON array into an XLSX file
    Export {
        /// Entity type: siswa, perusahaan, kumiai or lowongan
        #[arg(short, long)]
        entity: EntityKind,

        /// JSON file holding an array of records
        #[arg(short, long)]
        input: PathBuf,

        /// Directory the file is written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// File name without extension (default: data_<entity>)
        #[arg(short, long)]
        name: Option<String>,

        /// Append today's date to the file name
        #[arg(long)]
        dated: bool,
    },

    /// Write an empty import template for an entity
    Template {
        #[arg(short, long)]
        entity: EntityKind,

        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Parse a spreadsheet and show the first rows without importing
    Preview {
        /// Spreadsheet file (xlsx or xls)
        file: PathBuf,

        #[arg(short, long)]
        entity: EntityKind,

        /// Number of rows to show (default: from settings)
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Import a spreadsheet into a JSON store
    Import {
        /// Spreadsheet file (xlsx or xls)
        file: PathBuf,

        #[arg(short, long)]
        entity: EntityKind,

        /// JSON store file, created when missing
        #[arg(short, long)]
        store: PathBuf,

        /// Import even when cut values were detected
        #[arg(long)]
        accept_truncated: bool,
    },

    /// Show document tracking progress
    Tracking {
        /// JSON file holding an array of tracking records
        input: PathBuf,

        /// Show the timeline of one student instead of the table
        #[arg(long, value_name = "SISWA_ID")]
        timeline: Option<String>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = cli.settings.resolve()?;
    tracing::debug!(?settings, "settings resolved");
    let mut reporter = ConsoleReporter::default();

    match cli.command {
        Commands::Export {
            entity,
            input,
            out_dir,
            name,
            dated,
        } => export(entity, &input, &out_dir, name, dated, &settings, &mut reporter),
        Commands::Template { entity, out_dir } => template(entity, &out_dir, &settings),
        Commands::Preview { file, entity, rows } => {
            preview(&file, entity, rows.unwrap_or(settings.preview_rows), &settings, &mut reporter)
        }
        Commands::Import {
            file,
            entity,
            store,
            accept_truncated,
        } => import(&file, entity, &store, accept_truncated, &settings, &mut reporter),
        Commands::Tracking { input, timeline } => tracking(&input, timeline.as_deref()),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lpk=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in '{}'", path.display()))
}

fn export(
    entity: EntityKind,
    input: &Path,
    out_dir: &Path,
    name: Option<String>,
    dated: bool,
    settings: &TransferSettings,
    reporter: &mut ConsoleReporter,
) -> Result<()> {
    let records: Vec<Value> = read_json(input)?;
    let mut stem = name.unwrap_or_else(|| format!("data_{entity}"));
    if dated {
        stem = dated_stem(&stem, chrono::Local::now().date_naive());
    }

    let columns = entity.schema().columns();
    let mut sink = DirectorySink::new(out_dir);
    let report = export_to_excel(&records, &columns, &stem, settings, &mut sink)
        .with_context(|| format!("Failed to export {entity}"))?;
    reporter.warn_all(&report.warnings);

    if let Some(file) = report.file {
        let location = file.location.unwrap_or_else(|| PathBuf::from(&file.file_name));
        println!("Wrote {} rows to '{}'", report.rows, location.display());
    }
    Ok(())
}

fn template(entity: EntityKind, out_dir: &Path, settings: &TransferSettings) -> Result<()> {
    let columns = entity.schema().columns();
    let mut sink = DirectorySink::new(out_dir);
    let file = generate_template(&columns, entity.as_str(), settings, &mut sink)
        .with_context(|| format!("Failed to write template for {entity}"))?;
    let location = file.location.unwrap_or_else(|| PathBuf::from(&file.file_name));
    println!("Wrote template '{}'", location.display());
    Ok(())
}

fn parse_upload(
    file: &Path,
    entity: EntityKind,
    settings: &TransferSettings,
    reporter: &mut ConsoleReporter,
) -> Result<ParsedImport> {
    let upload = UploadedFile::from_path(file, settings)
        .with_context(|| format!("Failed to open '{}'", file.display()))?;
    let columns = entity.schema().columns();
    let parsed = parse_import(&upload, &columns, settings)
        .with_context(|| format!("Failed to parse '{}'", file.display()))?;
    reporter.warn_all(&parsed.warnings);
    if !parsed.unmatched_headers.is_empty() {
        eprintln!("Kolom diabaikan: {}", parsed.unmatched_headers.join(", "));
    }
    Ok(parsed)
}

fn preview(
    file: &Path,
    entity: EntityKind,
    rows: usize,
    settings: &TransferSettings,
    reporter: &mut ConsoleReporter,
) -> Result<()> {
    let parsed = parse_upload(file, entity, settings, reporter)?;
    println!(
        "{} ({}): {} baris data",
        parsed.file_name,
        parsed.format,
        parsed.records.len()
    );
    for record in parsed.preview(rows) {
        let values = serde_json::to_string(&record.values)?;
        println!("  baris {}: {}", record.row, values);
    }
    Ok(())
}

fn import(
    file: &Path,
    entity: EntityKind,
    store: &Path,
    accept_truncated: bool,
    settings: &TransferSettings,
    reporter: &mut ConsoleReporter,
) -> Result<()> {
    let parsed = parse_upload(file, entity, settings, reporter)?;
    if parsed.has_truncation() && !accept_truncated {
        bail!(
            "'{}' contains values cut on an earlier export; fix them or pass --accept-truncated",
            file.display()
        );
    }
    if parsed.records.is_empty() {
        return Ok(());
    }

    let mut repo = JsonFileRepository::open(store)
        .with_context(|| format!("Failed to open store '{}'", store.display()))?;
    let result = import_records(entity, &parsed.records, &mut repo);
    reporter.result(&result);
    Ok(())
}

fn tracking(input: &Path, timeline: Option<&str>) -> Result<()> {
    let records: Vec<DocumentTrackingRecord> = read_json(input)?;
    let mut out = std::io::stdout().lock();

    match timeline {
        Some(id) => {
            let record = records
                .iter()
                .find(|r| r.siswa_id == id)
                .with_context(|| format!("No tracking record for '{id}'"))?;
            if let Some(nama) = &record.nama_siswa {
                println!("{nama} ({id})");
            }
            render_timeline(&mut out, &student_timeline(record))?;
        }
        None => {
            let rows: Vec<_> = records.iter().map(staff_row).collect();
            render_staff_table(&mut out, &rows)?;
            println!();
            render_summary(&mut out, &summarize(&records))?;
        }
    }
    Ok(())
}
