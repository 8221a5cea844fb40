//! High-level service facade combining both stores, statistics, and reports.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::backend::{BackendKind, StoreBackend};
use crate::model::{CollectionSchedule, RecordId, ScheduleId, WasteRecord};
use crate::ports::{
    Clock, RecordFilter, RecordOrder, RecordStore, ScheduleStore, StoreError, SystemClock,
};
use crate::report::DailyReport;
use crate::stats::{DerivedStatistics, aggregate};
use crate::validation::{RecordInput, ScheduleInput, ValidationError};

#[derive(thiserror::Error, Debug)]
/// Errors surfaced to callers of [`WasteService`].
pub enum ServiceError {
    /// Input failed validation; nothing was stored.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The targeted entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of entity, `"record"` or `"schedule"`.
        entity: &'static str,
        /// Identifier as supplied by the caller.
        id: String,
    },
    /// The store could not complete the operation.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ServiceError {
    fn from_store(err: StoreError, entity: &'static str, id: impl ToString) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound {
                entity,
                id: id.to_string(),
            },
            other => Self::unavailable(other),
        }
    }

    fn unavailable(err: StoreError) -> Self {
        log::error!("store operation failed: {err}");
        Self::StoreUnavailable(err.to_string())
    }
}

/// Public entry point for recording, scheduling, and reporting.
pub struct WasteService {
    kind: BackendKind,
    records: Arc<dyn RecordStore>,
    schedules: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
}

impl WasteService {
    /// Create a service bound to the backend, reading time from the system clock.
    #[must_use]
    pub fn new(backend: StoreBackend) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock))
    }

    /// Create a service bound to the backend and an explicit clock.
    #[must_use]
    pub fn with_clock(backend: StoreBackend, clock: Arc<dyn Clock>) -> Self {
        Self {
            kind: backend.kind,
            records: backend.records,
            schedules: backend.schedules,
            clock,
        }
    }

    /// Which backend the service persists to.
    #[must_use]
    pub fn backend_kind(&self) -> BackendKind {
        self.kind
    }

    /// Validate and store a new waste record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for malformed input (the store is
    /// left untouched) or [`ServiceError::StoreUnavailable`] if the write fails.
    pub async fn create_record(&self, input: RecordInput) -> Result<WasteRecord, ServiceError> {
        let draft = input.validate()?;
        let record = draft.into_record(RecordId::generate(), self.clock.now());

        self.records
            .insert(record.clone())
            .await
            .map_err(ServiceError::unavailable)?;

        log::info!(
            "stored {} record {} ({} kg at {})",
            record.waste_type,
            record.id,
            record.amount,
            record.location
        );
        Ok(record)
    }

    /// List every record in the requested order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::StoreUnavailable`] if the store cannot be read.
    pub async fn records(&self, order: RecordOrder) -> Result<Vec<WasteRecord>, ServiceError> {
        self.query_records(&RecordFilter::default(), order).await
    }

    /// List records matching a filter in the requested order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::StoreUnavailable`] if the store cannot be read.
    pub async fn query_records(
        &self,
        filter: &RecordFilter,
        order: RecordOrder,
    ) -> Result<Vec<WasteRecord>, ServiceError> {
        log::debug!("querying records with {filter:?}, order {order}");

        let mut records = self
            .records
            .query(filter)
            .await
            .map_err(ServiceError::unavailable)?;

        if order == RecordOrder::Newest {
            records.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        }
        Ok(records)
    }

    /// Records whose timestamp falls within the UTC calendar day.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::StoreUnavailable`] if the store cannot be read.
    pub async fn records_for_day(&self, date: NaiveDate) -> Result<Vec<WasteRecord>, ServiceError> {
        self.query_records(&RecordFilter::day(date), RecordOrder::Insertion)
            .await
    }

    /// Records of one UTC calendar day together with their total weight.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::StoreUnavailable`] if the store cannot be read.
    pub async fn daily_report(&self, date: NaiveDate) -> Result<DailyReport, ServiceError> {
        let records = self.records_for_day(date).await?;
        Ok(DailyReport::new(date, records))
    }

    /// Delete a waste record.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown ids.
    pub async fn delete_record(&self, id: RecordId) -> Result<(), ServiceError> {
        self.records
            .remove(id)
            .await
            .map_err(|err| ServiceError::from_store(err, "record", id))?;
        log::info!("deleted record {id}");
        Ok(())
    }

    /// Validate and store a new collection schedule in the pending state.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Validation`] for malformed input or
    /// [`ServiceError::StoreUnavailable`] if the write fails.
    pub async fn create_schedule(
        &self,
        input: ScheduleInput,
    ) -> Result<CollectionSchedule, ServiceError> {
        let draft = input.validate()?;
        let schedule = draft.into_schedule(ScheduleId::generate(), self.clock.now());

        self.schedules
            .insert(schedule.clone())
            .await
            .map_err(ServiceError::unavailable)?;

        log::info!(
            "scheduled {} collection {} on {} for {}",
            schedule.frequency,
            schedule.id,
            schedule.schedule_date,
            schedule.assigned_to
        );
        Ok(schedule)
    }

    /// List every schedule, earliest date first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::StoreUnavailable`] if the store cannot be read.
    pub async fn schedules(&self) -> Result<Vec<CollectionSchedule>, ServiceError> {
        let mut schedules = self
            .schedules
            .list()
            .await
            .map_err(ServiceError::unavailable)?;
        schedules.sort_by_key(|schedule| schedule.schedule_date);
        Ok(schedules)
    }

    /// Mark a schedule as completed. Already completed schedules are returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown ids.
    pub async fn complete_schedule(
        &self,
        id: ScheduleId,
    ) -> Result<CollectionSchedule, ServiceError> {
        let schedule = self
            .schedules
            .complete(id)
            .await
            .map_err(|err| ServiceError::from_store(err, "schedule", id))?;
        log::info!("completed schedule {id}");
        Ok(schedule)
    }

    /// Delete a schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown ids.
    pub async fn delete_schedule(&self, id: ScheduleId) -> Result<(), ServiceError> {
        self.schedules
            .remove(id)
            .await
            .map_err(|err| ServiceError::from_store(err, "schedule", id))?;
        log::info!("deleted schedule {id}");
        Ok(())
    }

    /// Summary statistics over both stores as of today (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::StoreUnavailable`] if either store cannot be read.
    pub async fn statistics(&self) -> Result<DerivedStatistics, ServiceError> {
        let records = self
            .records
            .query(&RecordFilter::default())
            .await
            .map_err(ServiceError::unavailable)?;
        let schedules = self
            .schedules
            .list()
            .await
            .map_err(ServiceError::unavailable)?;

        Ok(aggregate(&records, &schedules, self.clock.today()))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::memory;
    use crate::model::{ScheduleStatus, WasteType};
    use crate::ports::FixedClock;
    use crate::validation::AmountInput;

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn service_at(now: DateTime<Utc>) -> WasteService {
        WasteService::with_clock(memory::backend(), Arc::new(FixedClock(now)))
    }

    fn record_input(occurred_at: &str, waste_type: &str, amount: f64) -> RecordInput {
        RecordInput {
            occurred_at: Some(occurred_at.to_owned()),
            waste_type: Some(waste_type.to_owned()),
            amount: Some(AmountInput::Number(amount)),
            location: Some("Harbour".to_owned()),
            coordinates: None,
            notes: Some("bagged".to_owned()),
        }
    }

    fn schedule_input(date: &str) -> ScheduleInput {
        ScheduleInput {
            schedule_date: Some(date.to_owned()),
            waste_type: Some("Mixed".to_owned()),
            frequency: Some("monthly".to_owned()),
            assigned_to: Some("crew-2".to_owned()),
            location: Some("Harbour".to_owned()),
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[tokio::test]
    async fn created_record_is_listed_once_with_all_fields() {
        let service = service_at(noon(2024, 3, 10));
        let created = service
            .create_record(record_input("2024-03-10T08:15:00", "Organic", 5.0))
            .await
            .expect("create");

        assert_eq!(created.created_at, noon(2024, 3, 10));
        assert_eq!(created.notes, "bagged");

        let listed = service.records(RecordOrder::Insertion).await.expect("list");
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn rejected_record_leaves_store_unchanged() {
        let service = service_at(noon(2024, 3, 10));
        service
            .create_record(record_input("2024-03-10", "Organic", 1.0))
            .await
            .expect("create");

        let err = service
            .create_record(record_input("2024-03-10", "Organic", -2.0))
            .await
            .expect_err("negative amount");
        assert!(matches!(err, ServiceError::Validation(_)));

        let missing = RecordInput {
            location: None,
            ..record_input("2024-03-10", "Organic", 1.0)
        };
        assert!(service.create_record(missing).await.is_err());

        let listed = service.records(RecordOrder::Insertion).await.expect("list");
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn oversized_amount_is_rejected_and_totals_stay_finite() {
        let service = service_at(noon(2024, 3, 10));
        service
            .create_record(record_input("2024-03-10", "Organic", 2.5))
            .await
            .expect("create");

        let err = service
            .create_record(record_input("2024-03-10", "Organic", 1.0e307))
            .await
            .expect_err("too large");
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::OutOfRange { field: "amount", .. })
        ));

        let stats = service.statistics().await.expect("statistics");
        assert!((stats.total_amount - 2.5).abs() < f64::EPSILON);
        let report = service
            .daily_report(date(2024, 3, 10))
            .await
            .expect("report");
        assert!((report.total_weight - 2.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn newest_order_sorts_by_creation_time() {
        let records = memory::backend();
        let early = WasteService::with_clock(
            StoreBackend::new(
                BackendKind::Memory,
                Arc::clone(&records.records),
                Arc::clone(&records.schedules),
            ),
            Arc::new(FixedClock(noon(2024, 3, 1))),
        );
        let late = WasteService::with_clock(records, Arc::new(FixedClock(noon(2024, 3, 2))));

        let older = early
            .create_record(record_input("2024-02-02", "Other", 2.0))
            .await
            .expect("create");
        let newer = late
            .create_record(record_input("2024-02-01", "Other", 1.0))
            .await
            .expect("create");

        let insertion = late.records(RecordOrder::Insertion).await.expect("list");
        assert_eq!(insertion, vec![older.clone(), newer.clone()]);

        let newest = late.records(RecordOrder::Newest).await.expect("list");
        assert_eq!(newest, vec![newer, older]);
    }

    #[tokio::test]
    async fn daily_report_uses_half_open_day() {
        let service = service_at(noon(2024, 3, 12));
        service
            .create_record(record_input("2024-03-10T23:59:59", "Organic", 2.5))
            .await
            .expect("create");
        service
            .create_record(record_input("2024-03-11T00:00:00", "Organic", 4.0))
            .await
            .expect("create");
        service
            .create_record(record_input("2024-03-10T00:00:00Z", "Hazardous", 1.25))
            .await
            .expect("create");

        let report = service.daily_report(date(2024, 3, 10)).await.expect("report");
        assert_eq!(report.records.len(), 2);
        assert!((report.total_weight - 3.75).abs() < f64::EPSILON);

        let empty = service.daily_report(date(2024, 3, 9)).await.expect("report");
        assert!(empty.records.is_empty());
        assert!(empty.total_weight.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn delete_record_reports_unknown_ids() {
        let service = service_at(noon(2024, 3, 10));
        let created = service
            .create_record(record_input("2024-03-10", "Electronic", 7.0))
            .await
            .expect("create");

        service.delete_record(created.id).await.expect("delete");
        let err = service
            .delete_record(created.id)
            .await
            .expect_err("already deleted");
        assert!(matches!(err, ServiceError::NotFound { entity: "record", .. }));
    }

    #[tokio::test]
    async fn schedules_list_by_date_and_complete_idempotently() {
        let service = service_at(noon(2024, 3, 10));
        let later = service
            .create_schedule(schedule_input("2024-04-01"))
            .await
            .expect("create");
        let sooner = service
            .create_schedule(schedule_input("2024-03-15"))
            .await
            .expect("create");
        assert_eq!(later.status, ScheduleStatus::Pending);

        let listed = service.schedules().await.expect("list");
        let ids: Vec<_> = listed.iter().map(|schedule| schedule.id).collect();
        assert_eq!(ids, vec![sooner.id, later.id]);

        let done = service.complete_schedule(sooner.id).await.expect("complete");
        assert_eq!(done.status, ScheduleStatus::Completed);
        let again = service.complete_schedule(sooner.id).await.expect("complete");
        assert_eq!(again.status, ScheduleStatus::Completed);

        service.delete_schedule(later.id).await.expect("delete");
        let err = service
            .complete_schedule(later.id)
            .await
            .expect_err("deleted");
        assert!(matches!(err, ServiceError::NotFound { entity: "schedule", .. }));
    }

    #[tokio::test]
    async fn statistics_reflect_both_stores() {
        let service = service_at(noon(2024, 3, 10));
        service
            .create_record(record_input("2024-03-09", "Organic", 5.0))
            .await
            .expect("create");
        service
            .create_record(record_input("2024-03-10", "Recyclable", 3.0))
            .await
            .expect("create");
        service
            .create_schedule(schedule_input("2024-03-10"))
            .await
            .expect("create");
        let past = service
            .create_schedule(schedule_input("2024-03-01"))
            .await
            .expect("create");
        service
            .create_schedule(schedule_input("2024-02-01"))
            .await
            .expect("create");
        service.complete_schedule(past.id).await.expect("complete");

        let stats = service.statistics().await.expect("stats");
        assert_eq!(stats.total_records, 2);
        assert!((stats.total_amount - 8.0).abs() < f64::EPSILON);
        assert_eq!(stats.unique_locations, 1);
        assert_eq!(
            stats
                .type_distribution
                .get(&WasteType::Organic)
                .map(|share| share.percentage),
            Some(50)
        );
        assert_eq!(stats.total_schedules, 3);
        assert_eq!(stats.pending_collections, 2);
        assert_eq!(stats.upcoming_collections, 1);
        assert_eq!(stats.overdue_collections, 1);
    }

    struct UnavailableStore;

    #[async_trait]
    impl RecordStore for UnavailableStore {
        async fn insert(&self, _record: WasteRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_owned()))
        }

        async fn query(&self, _filter: &RecordFilter) -> Result<Vec<WasteRecord>, StoreError> {
            Err(StoreError::Unavailable("offline".to_owned()))
        }

        async fn remove(&self, _id: RecordId) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_owned()))
        }
    }

    #[tokio::test]
    async fn store_failures_surface_as_unavailable() {
        let backend = memory::backend();
        let service = WasteService::with_clock(
            StoreBackend::new(BackendKind::Memory, Arc::new(UnavailableStore), backend.schedules),
            Arc::new(FixedClock(noon(2024, 3, 10))),
        );

        let err = service
            .create_record(record_input("2024-03-10", "Organic", 1.0))
            .await
            .expect_err("offline");
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));

        let err = service
            .delete_record(RecordId::generate())
            .await
            .expect_err("offline");
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));

        assert!(matches!(
            service.statistics().await,
            Err(ServiceError::StoreUnavailable(_))
        ));
    }
}
