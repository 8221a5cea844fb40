//! Store backend keeping records and schedules as JSON documents in a data directory.
//!
//! Each collection lives in its own file holding a JSON array in insertion
//! order. Writes go to a staging file that is renamed over the original.

mod collection;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;

use wastelog_core::{
    backend::{BackendKind, StoreBackend},
    model::{CollectionSchedule, RecordId, ScheduleId, WasteRecord},
    ports::{RecordFilter, RecordStore, ScheduleStore, StoreError},
};

use crate::collection::JsonCollection;

/// File name of the record collection inside the data directory.
pub const RECORDS_FILE: &str = "records.json";
/// File name of the schedule collection inside the data directory.
pub const SCHEDULES_FILE: &str = "schedules.json";

/// Record store persisted to `records.json`.
pub struct JsonRecordStore {
    collection: JsonCollection<WasteRecord>,
}

impl JsonRecordStore {
    /// Open or create the record document inside `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the file exists but cannot be read or parsed.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let collection = JsonCollection::open(data_dir.join(RECORDS_FILE)).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn insert(&self, record: WasteRecord) -> Result<(), StoreError> {
        self.collection
            .update(|records| {
                records.push(record);
                Ok(())
            })
            .await
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<WasteRecord>, StoreError> {
        Ok(self
            .collection
            .read(|records| {
                records
                    .iter()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn remove(&self, id: RecordId) -> Result<(), StoreError> {
        self.collection
            .update(|records| {
                let position = records
                    .iter()
                    .position(|record| record.id == id)
                    .ok_or(StoreError::NotFound)?;
                records.remove(position);
                Ok(())
            })
            .await
    }
}

/// Schedule store persisted to `schedules.json`.
pub struct JsonScheduleStore {
    collection: JsonCollection<CollectionSchedule>,
}

impl JsonScheduleStore {
    /// Open or create the schedule document inside `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the file exists but cannot be read or parsed.
    pub async fn open(data_dir: &Path) -> Result<Self, StoreError> {
        let collection = JsonCollection::open(data_dir.join(SCHEDULES_FILE)).await?;
        Ok(Self { collection })
    }
}

#[async_trait]
impl ScheduleStore for JsonScheduleStore {
    async fn insert(&self, schedule: CollectionSchedule) -> Result<(), StoreError> {
        self.collection
            .update(|schedules| {
                schedules.push(schedule);
                Ok(())
            })
            .await
    }

    async fn list(&self) -> Result<Vec<CollectionSchedule>, StoreError> {
        Ok(self.collection.read(<[CollectionSchedule]>::to_vec).await)
    }

    async fn complete(&self, id: ScheduleId) -> Result<CollectionSchedule, StoreError> {
        self.collection
            .update(|schedules| {
                let schedule = schedules
                    .iter_mut()
                    .find(|schedule| schedule.id == id)
                    .ok_or(StoreError::NotFound)?;
                schedule.mark_complete();
                Ok(schedule.clone())
            })
            .await
    }

    async fn remove(&self, id: ScheduleId) -> Result<(), StoreError> {
        self.collection
            .update(|schedules| {
                let position = schedules
                    .iter()
                    .position(|schedule| schedule.id == id)
                    .ok_or(StoreError::NotFound)?;
                schedules.remove(position);
                Ok(())
            })
            .await
    }
}

/// Build the backend bundle over the JSON documents in `data_dir`, creating the
/// directory if needed.
///
/// # Errors
///
/// Returns a [`StoreError`] when the directory cannot be created or an
/// existing document is unreadable.
pub async fn backend(data_dir: impl AsRef<Path>) -> Result<StoreBackend, StoreError> {
    let data_dir = data_dir.as_ref();
    fs::create_dir_all(data_dir).await?;

    let records = JsonRecordStore::open(data_dir).await?;
    let schedules = JsonScheduleStore::open(data_dir).await?;

    log::info!("using JSON store in {}", data_dir.display());

    Ok(StoreBackend::new(
        BackendKind::Json,
        Arc::new(records),
        Arc::new(schedules),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use wastelog_core::model::{Frequency, ScheduleStatus, ScheduleWasteType, WasteType};

    use super::*;

    fn record(day: u32, amount: f64) -> WasteRecord {
        let when = Utc.with_ymd_and_hms(2024, 3, day, 10, 30, 0).unwrap();
        WasteRecord {
            id: RecordId::generate(),
            occurred_at: when,
            waste_type: WasteType::Hazardous,
            amount,
            location: "Lab 4".to_owned(),
            coordinates: None,
            notes: String::new(),
            created_at: when,
        }
    }

    fn schedule() -> CollectionSchedule {
        CollectionSchedule {
            id: ScheduleId::generate(),
            schedule_date: NaiveDate::from_ymd_opt(2024, 3, 20).expect("date"),
            waste_type: ScheduleWasteType::Electronic,
            frequency: Frequency::BiWeekly,
            assigned_to: "crew-9".to_owned(),
            location: "Lab 4".to_owned(),
            status: ScheduleStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = record(10, 1.5);
        let second = record(11, 2.0);

        let store = JsonRecordStore::open(dir.path()).await.expect("open");
        store.insert(first.clone()).await.expect("insert");
        store.insert(second.clone()).await.expect("insert");

        let reopened = JsonRecordStore::open(dir.path()).await.expect("reopen");
        let all = reopened
            .query(&RecordFilter::default())
            .await
            .expect("query");
        assert_eq!(all, vec![first.clone(), second]);

        let day = reopened
            .query(&RecordFilter::day(NaiveDate::from_ymd_opt(2024, 3, 10).expect("date")))
            .await
            .expect("query");
        assert_eq!(day, vec![first]);
        assert!(!dir.path().join("records.json.tmp").exists());
    }

    #[tokio::test]
    async fn remove_unknown_record_is_not_found_and_keeps_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonRecordStore::open(dir.path()).await.expect("open");
        let kept = record(10, 3.0);
        store.insert(kept.clone()).await.expect("insert");

        let err = store
            .remove(RecordId::generate())
            .await
            .expect_err("unknown id");
        assert!(matches!(err, StoreError::NotFound));

        store.remove(kept.id).await.expect("remove");
        let reopened = JsonRecordStore::open(dir.path()).await.expect("reopen");
        assert!(
            reopened
                .query(&RecordFilter::default())
                .await
                .expect("query")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn completed_schedule_is_persisted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = backend(dir.path().join("nested")).await.expect("backend");
        assert_eq!(backend.kind, BackendKind::Json);

        let entry = schedule();
        backend
            .schedules
            .insert(entry.clone())
            .await
            .expect("insert");
        let done = backend.schedules.complete(entry.id).await.expect("complete");
        assert_eq!(done.status, ScheduleStatus::Completed);

        let again = backend.schedules.complete(entry.id).await.expect("complete");
        assert_eq!(again.status, ScheduleStatus::Completed);

        let reopened = JsonScheduleStore::open(&dir.path().join("nested"))
            .await
            .expect("reopen");
        let listed = reopened.list().await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(
            listed.first().map(|schedule| schedule.status),
            Some(ScheduleStatus::Completed)
        );

        reopened.remove(entry.id).await.expect("remove");
        assert!(matches!(
            reopened.complete(entry.id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn leftover_staging_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("records.json.tmp"), b"[{\"half").expect("write");

        let store = JsonRecordStore::open(dir.path()).await.expect("open");
        let kept = record(12, 7.25);
        store.insert(kept.clone()).await.expect("insert");

        assert!(!dir.path().join("records.json.tmp").exists());
        let raw = std::fs::read(dir.path().join(RECORDS_FILE)).expect("read");
        let on_disk: Vec<WasteRecord> = serde_json::from_slice(&raw).expect("complete document");
        assert_eq!(on_disk, vec![kept]);
    }

    #[tokio::test]
    async fn corrupt_document_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(RECORDS_FILE), b"{not json").expect("write");

        let err = JsonRecordStore::open(dir.path())
            .await
            .err()
            .expect("corrupt file must fail");
        assert!(matches!(err, StoreError::Json(_)));
    }

    #[tokio::test]
    async fn documents_use_camel_case_field_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonScheduleStore::open(dir.path()).await.expect("open");
        store.insert(schedule()).await.expect("insert");

        let raw = std::fs::read_to_string(dir.path().join(SCHEDULES_FILE)).expect("read");
        let json: serde_json::Value = serde_json::from_str(&raw).expect("parse");
        let first = json.get(0).expect("one document");
        assert_eq!(first["scheduleDate"], "2024-03-20");
        assert_eq!(first["frequency"], "bi-weekly");
        assert_eq!(first["assignedTo"], "crew-9");
        assert_eq!(first["status"], "pending");
    }
}
