//! Bundles of store ports the service can run on.

use std::sync::Arc;

use strum::{AsRefStr, Display, EnumString};

use crate::ports::{RecordStore, ScheduleStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
/// Built-in store backends.
pub enum BackendKind {
    /// JSON documents on disk.
    #[default]
    Json,
    /// Process memory, lost on exit.
    Memory,
}

/// Record and schedule stores sharing one persistence technology.
pub struct StoreBackend {
    /// Which backend produced the stores.
    pub kind: BackendKind,
    /// Implementation for waste records.
    pub records: Arc<dyn RecordStore>,
    /// Implementation for collection schedules.
    pub schedules: Arc<dyn ScheduleStore>,
}

impl StoreBackend {
    /// Bundle the provided stores.
    #[must_use]
    pub fn new(
        kind: BackendKind,
        records: Arc<dyn RecordStore>,
        schedules: Arc<dyn ScheduleStore>,
    ) -> Self {
        Self {
            kind,
            records,
            schedules,
        }
    }
}
