//! Import reconciliation: clean, validate, check for duplicates, store.
//!
//! Records are handled one at a time and in order. A record that fails any
//! step is counted and described in the result; the batch always runs to
//! the end, so `success + failed` equals the number of records given.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::clean::{clean_boolean, clean_date_with, clean_number, clean_text, CoercionError};
use crate::entities::{EntityKind, EntityRecord, FieldKind, FieldSpec};
use crate::import::ImportRecord;
use crate::repository::Repository;

/// Outcome of one import batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: usize,
    pub failed: usize,
    /// One message per failed record, in record order
    pub errors: Vec<String>,
}

impl ImportResult {
    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    fn record_failure(&mut self, error: RecordError) {
        tracing::debug!(%error, "record rejected");
        self.failed += 1;
        self.errors.push(error.to_string());
    }
}

/// Why one record was not stored
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("Baris {row}: {header} wajib diisi")]
    MissingField { row: u32, header: String },

    #[error("{label} {value} sudah ada dalam database")]
    Duplicate { label: String, value: String },

    #[error("Baris {row}: gagal menyimpan ({message})")]
    Persistence { row: u32, message: String },

    #[error("Baris {row}: data tidak valid ({message})")]
    Invalid { row: u32, message: String },
}

/// Clean one field. `Ok(None)` means no usable value.
fn clean_field(field: &FieldSpec, raw: Option<&Value>, date_1904: bool) -> Result<Option<Value>, CoercionError> {
    Ok(match field.kind {
        FieldKind::Text => clean_text(raw)?.map(Value::String),
        FieldKind::Number => clean_number(raw)?
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        FieldKind::Boolean => clean_boolean(raw)?.map(Value::Bool),
        FieldKind::Date => clean_date_with(raw, date_1904)?.map(date_value),
    })
}

fn date_value(date: NaiveDate) -> Value {
    Value::String(date.format("%Y-%m-%d").to_string())
}

/// Clean every field of `record` and build the typed entity.
///
/// Values that cannot be read on optional fields are dropped. On a
/// mandatory field they count as missing.
pub fn build_record(kind: EntityKind, record: &ImportRecord) -> Result<EntityRecord, RecordError> {
    let schema = kind.schema();
    let mut cleaned = Map::new();

    for field in schema.fields {
        let path = field.field_path();
        let value = match clean_field(field, record.get(&path), record.date_1904) {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(row = record.row, field = field.path, %error, "value dropped");
                None
            }
        };
        match value {
            Some(value) => path.set(&mut cleaned, value),
            None if field.required => {
                return Err(RecordError::MissingField {
                    row: record.row,
                    header: field.header.to_string(),
                })
            }
            None => {}
        }
    }

    EntityRecord::from_cleaned(kind, cleaned).map_err(|e| RecordError::Invalid {
        row: record.row,
        message: e.to_string(),
    })
}

/// Import a batch of parsed rows as entities of `kind`
pub fn import_records(
    kind: EntityKind,
    records: &[ImportRecord],
    repo: &mut dyn Repository,
) -> ImportResult {
    let schema = kind.schema();
    let key_path = schema.natural_key_path();
    let mut result = ImportResult::default();

    for record in records {
        let entity = match build_record(kind, record) {
            Ok(entity) => entity,
            Err(e) => {
                result.record_failure(e);
                continue;
            }
        };
        let key = entity.natural_key();

        match repo.find_by_unique_field(kind, &key_path, key) {
            Ok(Some(_)) => {
                result.record_failure(RecordError::Duplicate {
                    label: schema.key_label.to_string(),
                    value: key.to_string(),
                });
                continue;
            }
            Ok(None) => {}
            Err(e) => {
                result.record_failure(RecordError::Persistence {
                    row: record.row,
                    message: e.message,
                });
                continue;
            }
        }

        match repo.create(&entity) {
            Ok(id) => {
                tracing::debug!(row = record.row, %id, "record stored");
                result.success += 1;
            }
            Err(e) => result.record_failure(RecordError::Persistence {
                row: record.row,
                message: e.message,
            }),
        }
    }

    tracing::info!(
        entity = %kind,
        success = result.success,
        failed = result.failed,
        "import finished"
    );
    result
}

/// Import students
pub fn import_siswa(records: &[ImportRecord], repo: &mut dyn Repository) -> ImportResult {
    import_records(EntityKind::Siswa, records, repo)
}

/// Import partner companies
pub fn import_perusahaan(records: &[ImportRecord], repo: &mut dyn Repository) -> ImportResult {
    import_records(EntityKind::Perusahaan, records, repo)
}

/// Import cooperatives
pub fn import_kumiai(records: &[ImportRecord], repo: &mut dyn Repository) -> ImportResult {
    import_records(EntityKind::Kumiai, records, repo)
}

/// Import job positions
pub fn import_lowongan(records: &[ImportRecord], repo: &mut dyn Repository) -> ImportResult {
    import_records(EntityKind::Lowongan, records, repo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Siswa;
    use crate::path::FieldPath;
    use crate::repository::{MemoryRepository, PersistenceError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row(row: u32, value: Value) -> ImportRecord {
        match value {
            Value::Object(map) => ImportRecord::new(row, map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_build_record_cleans_fields() {
        let record = row(
            2,
            json!({
                "nik": 3201010101010001u64,
                "nama": "  Ayu Lestari ",
                "tanggal_lahir": "17/08/2001",
                "tinggi_badan": "160",
                "berat_badan": "52,5",
                "sudah_menikah": "Tidak",
                "orang_tua": {"nama": "Slamet...[cut]"}
            }),
        );
        let EntityRecord::Siswa(siswa) = build_record(EntityKind::Siswa, &record).unwrap() else {
            panic!("wrong entity");
        };
        assert_eq!(siswa.nik, "3201010101010001");
        assert_eq!(siswa.nama, "Ayu Lestari");
        assert_eq!(siswa.tanggal_lahir, NaiveDate::from_ymd_opt(2001, 8, 17));
        assert_eq!(siswa.tinggi_badan, Some(160.0));
        assert_eq!(siswa.berat_badan, None);
        assert_eq!(siswa.sudah_menikah, Some(false));
        assert_eq!(siswa.orang_tua.nama.as_deref(), Some("Slamet"));
    }

    #[test]
    fn test_missing_mandatory_field() {
        let record = row(7, json!({"nik": "3201", "nama": "   "}));
        assert_eq!(
            build_record(EntityKind::Siswa, &record).unwrap_err().to_string(),
            "Baris 7: Nama Lengkap wajib diisi"
        );
    }

    #[test]
    fn test_duplicate_nik_scenario() {
        let mut repo = MemoryRepository::new();
        repo.seed(EntityKind::Siswa, json!({"nik": "3201000000000002", "nama": "Lama"}));
        let records = vec![
            row(2, json!({"nik": "3201000000000001", "nama": "Baru"})),
            row(3, json!({"nik": "3201000000000002", "nama": "Duplikat"})),
        ];
        let result = import_siswa(&records, &mut repo);
        assert_eq!(
            result,
            ImportResult {
                success: 1,
                failed: 1,
                errors: vec!["NIK 3201000000000002 sudah ada dalam database".into()],
            }
        );
    }

    #[test]
    fn test_duplicate_inside_batch() {
        let mut repo = MemoryRepository::new();
        let records = vec![
            row(2, json!({"kode": "K-1", "nama": "Sakura"})),
            row(3, json!({"kode": "k-1 ", "nama": "Sakura lagi"})),
        ];
        let result = import_kumiai(&records, &mut repo);
        assert_eq!(result.success, 1);
        assert_eq!(result.errors, vec!["Kode Kumiai k-1 sudah ada dalam database".to_string()]);
    }

    struct FailingRepository;

    impl Repository for FailingRepository {
        fn find_by_unique_field(
            &self,
            _kind: EntityKind,
            _field: &FieldPath,
            _value: &str,
        ) -> Result<Option<Value>, PersistenceError> {
            Ok(None)
        }

        fn create(&mut self, _record: &EntityRecord) -> Result<String, PersistenceError> {
            Err(PersistenceError::new("koneksi terputus"))
        }
    }

    #[test]
    fn test_persistence_errors_do_not_abort() {
        let records = vec![
            row(2, json!({"nama": "PT Maju"})),
            row(3, json!({"bidang_usaha": "Konstruksi"})),
        ];
        let result = import_perusahaan(&records, &mut FailingRepository);
        assert_eq!(result.total(), 2);
        assert_eq!(
            result.errors,
            vec![
                "Baris 2: gagal menyimpan (koneksi terputus)".to_string(),
                "Baris 3: Nama Perusahaan wajib diisi".to_string(),
            ]
        );
    }

    #[test]
    fn test_lowongan_numbers_and_dates() {
        let mut repo = MemoryRepository::new();
        let records = vec![row(
            2,
            json!({"kode": "L-9", "judul": "Welder", "kuota": 5, "tanggal_tutup": 45291, "aktif": "ya"}),
        )];
        let result = import_lowongan(&records, &mut repo);
        assert_eq!(result.success, 1);
        let stored = &repo.records(EntityKind::Lowongan)[0];
        assert_eq!(stored["kuota"], json!(5.0));
        assert_eq!(stored["tanggal_tutup"], json!("2023-12-31"));
        assert_eq!(stored["aktif"], json!(true));
    }

    #[test]
    fn test_typed_siswa_roundtrip_through_store() {
        let mut repo = MemoryRepository::new();
        import_siswa(&[row(2, json!({"nik": "1", "nama": "A"}))], &mut repo);
        let stored: Siswa = serde_json::from_value(repo.records(EntityKind::Siswa)[0].clone()).unwrap();
        assert_eq!(stored.nik, "1");
    }
}
