//! Importable entities: their schemas and typed records.
//!
//! A schema lists the spreadsheet columns of an entity, the cleaning rule
//! for each, which ones are mandatory, and the natural key used to detect
//! duplicates. The typed structs are what a cleaned row turns into.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::columns::ExportColumn;
use crate::path::FieldPath;

/// The entity types the pipeline can import and export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Student (trainee)
    Siswa,
    /// Partner company in Japan
    Perusahaan,
    /// Cooperative sponsoring the interns
    Kumiai,
    /// Job position
    Lowongan,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Siswa,
        EntityKind::Perusahaan,
        EntityKind::Kumiai,
        EntityKind::Lowongan,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Siswa => "siswa",
            EntityKind::Perusahaan => "perusahaan",
            EntityKind::Kumiai => "kumiai",
            EntityKind::Lowongan => "lowongan",
        }
    }

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::Siswa => &SISWA,
            EntityKind::Perusahaan => &PERUSAHAAN,
            EntityKind::Kumiai => &KUMIAI,
            EntityKind::Lowongan => &LOWONGAN,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised entity name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity '{0}' (expected siswa, perusahaan, kumiai or lowongan)")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

// ==================== Schemas ====================

/// How a raw cell value is cleaned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
}

/// One column of an entity
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Dotted path inside the record
    pub path: &'static str,
    /// Spreadsheet column label
    pub header: &'static str,
    pub kind: FieldKind,
    /// Rows without a value here are rejected
    pub required: bool,
}

impl FieldSpec {
    const fn new(path: &'static str, header: &'static str, kind: FieldKind) -> Self {
        Self {
            path,
            header,
            kind,
            required: false,
        }
    }

    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn field_path(&self) -> FieldPath {
        FieldPath::parse(self.path)
    }
}

/// Column layout and keys of one entity
#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    /// Name of the storage collection
    pub collection: &'static str,
    /// Path of the natural key
    pub natural_key: &'static str,
    /// How the natural key is named in duplicate messages
    pub key_label: &'static str,
    pub fields: &'static [FieldSpec],
}

impl EntitySchema {
    /// Columns in schema order, for export and template generation
    pub fn columns(&self) -> Vec<ExportColumn> {
        self.fields
            .iter()
            .map(|f| ExportColumn::new(f.path, f.header))
            .collect()
    }

    pub fn natural_key_path(&self) -> FieldPath {
        FieldPath::parse(self.natural_key)
    }

    pub fn field(&self, path: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.path == path)
    }
}

use FieldKind::{Boolean, Date, Number, Text};

static SISWA_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("nik", "NIK", Text).required(),
    FieldSpec::new("nama", "Nama Lengkap", Text).required(),
    FieldSpec::new("jenis_kelamin", "Jenis Kelamin", Text),
    FieldSpec::new("tempat_lahir", "Tempat Lahir", Text),
    FieldSpec::new("tanggal_lahir", "Tanggal Lahir", Date),
    FieldSpec::new("alamat", "Alamat", Text),
    FieldSpec::new("telepon", "No. Telepon", Text),
    FieldSpec::new("email", "Email", Text),
    FieldSpec::new("pendidikan_terakhir", "Pendidikan Terakhir", Text),
    FieldSpec::new("tinggi_badan", "Tinggi Badan (cm)", Number),
    FieldSpec::new("berat_badan", "Berat Badan (kg)", Number),
    FieldSpec::new("sudah_menikah", "Sudah Menikah", Boolean),
    FieldSpec::new("orang_tua.nama", "Nama Orang Tua", Text),
    FieldSpec::new("orang_tua.telepon", "Telepon Orang Tua", Text),
    FieldSpec::new("orang_tua.pekerjaan", "Pekerjaan Orang Tua", Text),
    FieldSpec::new("tanggal_daftar", "Tanggal Daftar", Date),
    FieldSpec::new("status", "Status", Text),
];

static PERUSAHAAN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("nama", "Nama Perusahaan", Text).required(),
    FieldSpec::new("bidang_usaha", "Bidang Usaha", Text),
    FieldSpec::new("alamat", "Alamat", Text),
    FieldSpec::new("kota", "Kota", Text),
    FieldSpec::new("prefektur", "Prefektur", Text),
    FieldSpec::new("kumiai_kode", "Kode Kumiai", Text),
    FieldSpec::new("kontak.nama", "Nama PIC", Text),
    FieldSpec::new("kontak.telepon", "Telepon PIC", Text),
    FieldSpec::new("kontak.email", "Email PIC", Text),
    FieldSpec::new("jumlah_karyawan", "Jumlah Karyawan", Number),
    FieldSpec::new("aktif", "Aktif", Boolean),
];

static KUMIAI_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("kode", "Kode Kumiai", Text).required(),
    FieldSpec::new("nama", "Nama Kumiai", Text).required(),
    FieldSpec::new("alamat", "Alamat", Text),
    FieldSpec::new("prefektur", "Prefektur", Text),
    FieldSpec::new("kontak.nama", "Nama PIC", Text),
    FieldSpec::new("kontak.telepon", "Telepon PIC", Text),
    FieldSpec::new("kontak.email", "Email PIC", Text),
    FieldSpec::new("tanggal_kerja_sama", "Tanggal Kerja Sama", Date),
    FieldSpec::new("aktif", "Aktif", Boolean),
];

static LOWONGAN_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("kode", "Kode Lowongan", Text).required(),
    FieldSpec::new("judul", "Judul Lowongan", Text).required(),
    FieldSpec::new("perusahaan", "Nama Perusahaan", Text),
    FieldSpec::new("kumiai_kode", "Kode Kumiai", Text),
    FieldSpec::new("bidang", "Bidang Pekerjaan", Text),
    FieldSpec::new("lokasi", "Lokasi Kerja", Text),
    FieldSpec::new("kuota", "Kuota", Number),
    FieldSpec::new("gaji_pokok", "Gaji Pokok (JPY)", Number),
    FieldSpec::new("jenis_kelamin", "Jenis Kelamin", Text),
    FieldSpec::new("usia_min", "Usia Minimal", Number),
    FieldSpec::new("usia_max", "Usia Maksimal", Number),
    FieldSpec::new("tanggal_tutup", "Tanggal Tutup", Date),
    FieldSpec::new("aktif", "Aktif", Boolean),
];

static SISWA: EntitySchema = EntitySchema {
    kind: EntityKind::Siswa,
    collection: "siswa",
    natural_key: "nik",
    key_label: "NIK",
    fields: SISWA_FIELDS,
};

static PERUSAHAAN: EntitySchema = EntitySchema {
    kind: EntityKind::Perusahaan,
    collection: "perusahaan",
    natural_key: "nama",
    key_label: "Perusahaan",
    fields: PERUSAHAAN_FIELDS,
};

static KUMIAI: EntitySchema = EntitySchema {
    kind: EntityKind::Kumiai,
    collection: "kumiai",
    natural_key: "kode",
    key_label: "Kode Kumiai",
    fields: KUMIAI_FIELDS,
};

static LOWONGAN: EntitySchema = EntitySchema {
    kind: EntityKind::Lowongan,
    collection: "lowongan",
    natural_key: "kode",
    key_label: "Kode Lowongan",
    fields: LOWONGAN_FIELDS,
};

// ==================== Typed records ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrangTua {
    pub nama: Option<String>,
    pub telepon: Option<String>,
    pub pekerjaan: Option<String>,
}

/// Contact person of a company or cooperative
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kontak {
    pub nama: Option<String>,
    pub telepon: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Siswa {
    pub nik: String,
    pub nama: String,
    pub jenis_kelamin: Option<String>,
    pub tempat_lahir: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub alamat: Option<String>,
    pub telepon: Option<String>,
    pub email: Option<String>,
    pub pendidikan_terakhir: Option<String>,
    pub tinggi_badan: Option<f64>,
    pub berat_badan: Option<f64>,
    pub sudah_menikah: Option<bool>,
    #[serde(default)]
    pub orang_tua: OrangTua,
    pub tanggal_daftar: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perusahaan {
    pub nama: String,
    pub bidang_usaha: Option<String>,
    pub alamat: Option<String>,
    pub kota: Option<String>,
    pub prefektur: Option<String>,
    pub kumiai_kode: Option<String>,
    #[serde(default)]
    pub kontak: Kontak,
    pub jumlah_karyawan: Option<f64>,
    pub aktif: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kumiai {
    pub kode: String,
    pub nama: String,
    pub alamat: Option<String>,
    pub prefektur: Option<String>,
    #[serde(default)]
    pub kontak: Kontak,
    pub tanggal_kerja_sama: Option<NaiveDate>,
    pub aktif: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lowongan {
    pub kode: String,
    pub judul: String,
    pub perusahaan: Option<String>,
    pub kumiai_kode: Option<String>,
    pub bidang: Option<String>,
    pub lokasi: Option<String>,
    pub kuota: Option<f64>,
    pub gaji_pokok: Option<f64>,
    pub jenis_kelamin: Option<String>,
    pub usia_min: Option<f64>,
    pub usia_max: Option<f64>,
    pub tanggal_tutup: Option<NaiveDate>,
    pub aktif: Option<bool>,
}

/// A cleaned, validated row ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "lowercase")]
pub enum EntityRecord {
    Siswa(Siswa),
    Perusahaan(Perusahaan),
    Kumiai(Kumiai),
    Lowongan(Lowongan),
}

impl EntityRecord {
    /// Build the typed record of `kind` from a map of cleaned values
    pub fn from_cleaned(kind: EntityKind, cleaned: Map<String, Value>) -> serde_json::Result<Self> {
        let value = Value::Object(cleaned);
        Ok(match kind {
            EntityKind::Siswa => EntityRecord::Siswa(serde_json::from_value(value)?),
            EntityKind::Perusahaan => EntityRecord::Perusahaan(serde_json::from_value(value)?),
            EntityKind::Kumiai => EntityRecord::Kumiai(serde_json::from_value(value)?),
            EntityKind::Lowongan => EntityRecord::Lowongan(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRecord::Siswa(_) => EntityKind::Siswa,
            EntityRecord::Perusahaan(_) => EntityKind::Perusahaan,
            EntityRecord::Kumiai(_) => EntityKind::Kumiai,
            EntityRecord::Lowongan(_) => EntityKind::Lowongan,
        }
    }

    /// Value of the natural key (NIK, company name or code)
    pub fn natural_key(&self) -> &str {
        match self {
            EntityRecord::Siswa(s) => &s.nik,
            EntityRecord::Perusahaan(p) => &p.nama,
            EntityRecord::Kumiai(k) => &k.kode,
            EntityRecord::Lowongan(l) => &l.kode,
        }
    }

    /// The record's fields without the entity tag
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            EntityRecord::Siswa(s) => serde_json::to_value(s),
            EntityRecord::Perusahaan(p) => serde_json::to_value(p),
            EntityRecord::Kumiai(k) => serde_json::to_value(k),
            EntityRecord::Lowongan(l) => serde_json::to_value(l),
        }
    }
}
