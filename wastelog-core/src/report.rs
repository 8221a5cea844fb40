//! Per-day collection report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::WasteRecord;
use crate::stats::total_weight;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Records collected on one UTC calendar day and their combined weight.
pub struct DailyReport {
    /// Day the report covers.
    pub date: NaiveDate,
    /// Records whose `occurred_at` falls inside the day.
    pub records: Vec<WasteRecord>,
    /// Sum of record amounts in kilograms, rounded to two decimals.
    pub total_weight: f64,
}

impl DailyReport {
    /// Build a report from the records already selected for `date`.
    #[must_use]
    pub fn new(date: NaiveDate, records: Vec<WasteRecord>) -> Self {
        let total_weight = total_weight(&records);
        Self {
            date,
            records,
            total_weight,
        }
    }
}
