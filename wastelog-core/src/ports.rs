//! Traits describing store capabilities and shared helper types.

use std::io::Error as IoError;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use strum::{AsRefStr, Display, EnumString};

use crate::model::{
    BoundingBox, CollectionSchedule, RecordId, ScheduleId, WasteRecord, WasteType, day_window,
};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to a store backend.
pub enum StoreError {
    /// No entity with the requested id exists.
    #[error("Entity not found")]
    NotFound,
    /// The backend cannot serve requests.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// Reading or writing the backing files failed.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
    /// A stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Json(#[from] JsonError),
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Conjunctive record query. Empty filters match everything.
pub struct RecordFilter {
    /// Earliest `occurred_at`, inclusive.
    pub from: Option<DateTime<Utc>>,
    /// Latest `occurred_at`, exclusive.
    pub to: Option<DateTime<Utc>>,
    /// Only this waste type.
    pub waste_type: Option<WasteType>,
    /// Only this exact location label.
    pub location: Option<String>,
    /// Only records with coordinates inside this box.
    pub bbox: Option<BoundingBox>,
}

impl RecordFilter {
    /// Filter selecting the half-open UTC window of one calendar day.
    #[must_use]
    pub fn day(date: NaiveDate) -> Self {
        let (start, end) = day_window(date);
        Self {
            from: Some(start),
            to: Some(end),
            ..Self::default()
        }
    }

    /// Check whether a record satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, record: &WasteRecord) -> bool {
        if self.from.is_some_and(|from| record.occurred_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| record.occurred_at >= to) {
            return false;
        }
        if self
            .waste_type
            .is_some_and(|waste_type| record.waste_type != waste_type)
        {
            return false;
        }
        if self
            .location
            .as_deref()
            .is_some_and(|location| record.location != location)
        {
            return false;
        }
        match (&self.bbox, &record.coordinates) {
            (None, _) => true,
            (Some(bbox), Some(point)) => bbox.contains(point),
            (Some(_), None) => false,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
/// Ordering applied when listing records.
pub enum RecordOrder {
    /// Oldest insertion first.
    #[default]
    Insertion,
    /// Most recently stored first.
    Newest,
}

#[async_trait]
/// Persistence backend for waste records.
///
/// Implementations return records in insertion order and make each write
/// visible to readers all at once or not at all.
pub trait RecordStore: Send + Sync {
    /// Persist a new record.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend rejects the write.
    async fn insert(&self, record: WasteRecord) -> Result<(), StoreError>;

    /// Return all records matching the filter, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend cannot be read.
    async fn query(&self, filter: &RecordFilter) -> Result<Vec<WasteRecord>, StoreError>;

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids.
    async fn remove(&self, id: RecordId) -> Result<(), StoreError>;
}

#[async_trait]
/// Persistence backend for collection schedules.
pub trait ScheduleStore: Send + Sync {
    /// Persist a new schedule.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend rejects the write.
    async fn insert(&self, schedule: CollectionSchedule) -> Result<(), StoreError>;

    /// Return all schedules in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend cannot be read.
    async fn list(&self) -> Result<Vec<CollectionSchedule>, StoreError>;

    /// Mark a schedule completed and return it. Completed schedules stay completed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids.
    async fn complete(&self, id: ScheduleId) -> Result<CollectionSchedule, StoreError>;

    /// Delete a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown ids.
    async fn remove(&self, id: ScheduleId) -> Result<(), StoreError>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar day in UTC.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
/// Clock frozen at a single instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
