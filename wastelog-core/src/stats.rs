//! Summary statistics derived from records and schedules.
//!
//! Everything here is recomputed from scratch on each call; nothing is cached.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{CollectionSchedule, WasteRecord, WasteType};
use crate::validation::MAX_AMOUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Count of records of one waste type and its share of all records.
pub struct TypeShare {
    /// Number of records of this type.
    pub count: usize,
    /// Share of all records, whole percent rounded half up.
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Transient view over both stores.
pub struct DerivedStatistics {
    /// Number of records.
    pub total_records: usize,
    /// Sum of record amounts in kilograms, rounded to two decimals.
    pub total_amount: f64,
    /// Number of distinct location labels.
    pub unique_locations: usize,
    /// Per-type counts and shares. Types without records are absent.
    pub type_distribution: BTreeMap<WasteType, TypeShare>,
    /// Number of schedules.
    pub total_schedules: usize,
    /// Schedules still pending.
    pub pending_collections: usize,
    /// Schedules dated today or later.
    pub upcoming_collections: usize,
    /// Pending schedules dated before today.
    pub overdue_collections: usize,
}

/// Aggregate records and schedules as seen on `today`.
///
/// Never fails: a record whose amount is not finite or above [`MAX_AMOUNT`]
/// contributes zero to the total but still counts towards its type and location.
#[must_use]
pub fn aggregate(
    records: &[WasteRecord],
    schedules: &[CollectionSchedule],
    today: NaiveDate,
) -> DerivedStatistics {
    let mut counts: BTreeMap<WasteType, usize> = BTreeMap::new();
    let mut locations: HashSet<&str> = HashSet::new();
    let mut total_amount = 0.0;

    for record in records {
        *counts.entry(record.waste_type).or_default() += 1;
        total_amount += amount_contribution(record);
        locations.insert(record.location.as_str());
    }

    let total_records = records.len();
    let type_distribution = counts
        .into_iter()
        .map(|(waste_type, count)| {
            (
                waste_type,
                TypeShare {
                    count,
                    percentage: percentage(count, total_records),
                },
            )
        })
        .collect();

    DerivedStatistics {
        total_records,
        total_amount: round_cents(total_amount),
        unique_locations: locations.len(),
        type_distribution,
        total_schedules: schedules.len(),
        pending_collections: schedules.iter().filter(|entry| entry.is_pending()).count(),
        upcoming_collections: schedules
            .iter()
            .filter(|entry| entry.is_upcoming(today))
            .count(),
        overdue_collections: schedules
            .iter()
            .filter(|entry| entry.is_overdue(today))
            .count(),
    }
}

/// Sum of record amounts rounded to two decimals; zero for no records.
#[must_use]
pub fn total_weight(records: &[WasteRecord]) -> f64 {
    round_cents(records.iter().map(amount_contribution).sum())
}

/// Round to two decimal places, halves away from zero.
///
/// Values too large to scale are returned unchanged.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

fn amount_contribution(record: &WasteRecord) -> f64 {
    if record.amount.is_finite() && record.amount <= MAX_AMOUNT {
        record.amount
    } else {
        log::warn!(
            "record {} has unusable amount {}, counting it as 0",
            record.id,
            record.amount
        );
        0.0
    }
}

// Integer half-up rounding of 100 * count / total.
fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let count = count as u128;
    let total = total as u128;
    let rounded = (200 * count + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
