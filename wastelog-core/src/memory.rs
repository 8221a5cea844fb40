//! Store adapters keeping everything in process memory.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::backend::{BackendKind, StoreBackend};
use crate::model::{CollectionSchedule, RecordId, ScheduleId, WasteRecord};
use crate::ports::{RecordFilter, RecordStore, ScheduleStore, StoreError};

fn poisoned<T>(err: PoisonError<T>) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[derive(Debug, Default)]
/// Record store backed by a locked vector.
pub struct MemoryRecordStore {
    records: RwLock<Vec<WasteRecord>>,
}

impl MemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: WasteRecord) -> Result<(), StoreError> {
        self.records.write().map_err(poisoned)?.push(record);
        Ok(())
    }

    async fn query(&self, filter: &RecordFilter) -> Result<Vec<WasteRecord>, StoreError> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    async fn remove(&self, id: RecordId) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(poisoned)?;
        let position = records
            .iter()
            .position(|record| record.id == id)
            .ok_or(StoreError::NotFound)?;
        records.remove(position);
        Ok(())
    }
}

#[derive(Debug, Default)]
/// Schedule store backed by a locked vector.
pub struct MemoryScheduleStore {
    schedules: RwLock<Vec<CollectionSchedule>>,
}

impl MemoryScheduleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn insert(&self, schedule: CollectionSchedule) -> Result<(), StoreError> {
        self.schedules.write().map_err(poisoned)?.push(schedule);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<CollectionSchedule>, StoreError> {
        Ok(self.schedules.read().map_err(poisoned)?.clone())
    }

    async fn complete(&self, id: ScheduleId) -> Result<CollectionSchedule, StoreError> {
        let mut schedules = self.schedules.write().map_err(poisoned)?;
        let schedule = schedules
            .iter_mut()
            .find(|schedule| schedule.id == id)
            .ok_or(StoreError::NotFound)?;
        schedule.mark_complete();
        Ok(schedule.clone())
    }

    async fn remove(&self, id: ScheduleId) -> Result<(), StoreError> {
        let mut schedules = self.schedules.write().map_err(poisoned)?;
        let position = schedules
            .iter()
            .position(|schedule| schedule.id == id)
            .ok_or(StoreError::NotFound)?;
        schedules.remove(position);
        Ok(())
    }
}

/// Build the backend bundle for in-memory storage.
#[must_use]
pub fn backend() -> StoreBackend {
    StoreBackend::new(
        BackendKind::Memory,
        Arc::new(MemoryRecordStore::new()),
        Arc::new(MemoryScheduleStore::new()),
    )
}
