//! Domain data structures for waste records, collection schedules, and their identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier for a stored waste record.
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier for a stored collection schedule.
pub struct ScheduleId(pub Uuid);

impl ScheduleId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for ScheduleId {
    type Err = uuid::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw.trim()).map(Self)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
/// Kinds of waste a collection event can log.
///
/// Names match exactly; `"organic"` is not accepted for [`WasteType::Organic`].
pub enum WasteType {
    /// Paper, plastics, glass, and metals bound for recycling.
    Recyclable,
    /// Food and garden waste.
    Organic,
    /// Chemicals, batteries, and similar hazardous material.
    Hazardous,
    /// Discarded electrical and electronic equipment.
    Electronic,
    /// Anything not covered above.
    Other,
}

impl WasteType {
    /// Every waste type in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Recyclable,
        Self::Organic,
        Self::Hazardous,
        Self::Electronic,
        Self::Other,
    ];
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
/// Waste stream a scheduled collection picks up.
pub enum ScheduleWasteType {
    /// Recyclables only.
    Recyclable,
    /// Organic waste only.
    Organic,
    /// Hazardous waste only.
    Hazardous,
    /// Electronic waste only.
    Electronic,
    /// Other waste.
    Other,
    /// Several streams in one pickup.
    Mixed,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
/// How often a scheduled collection repeats.
pub enum Frequency {
    /// A single pickup.
    OneTime,
    /// Every week.
    #[default]
    Weekly,
    /// Every second week.
    BiWeekly,
    /// Once a month.
    Monthly,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
/// Progress of a scheduled collection. Only moves from pending to completed.
pub enum ScheduleStatus {
    /// Not yet collected.
    #[default]
    Pending,
    /// Collected.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Geographic position of a collection point in WGS84 degrees.
pub struct Coordinates {
    /// Longitude, `-180..=180`.
    pub longitude: f64,
    /// Latitude, `-90..=90`.
    pub latitude: f64,
}

impl Coordinates {
    /// Check that both components are finite and within their ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] naming the offending component.
    pub fn validate(self) -> Result<Self, ValidationError> {
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::OutOfRange {
                field: "coordinates.longitude",
                value: self.longitude,
            });
        }
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::OutOfRange {
                field: "coordinates.latitude",
                value: self.latitude,
            });
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Axis-aligned box used for simple proximity filtering. Edges are inclusive.
pub struct BoundingBox {
    /// Minimum longitude.
    pub west: f64,
    /// Minimum latitude.
    pub south: f64,
    /// Maximum longitude.
    pub east: f64,
    /// Maximum latitude.
    pub north: f64,
}

impl BoundingBox {
    /// Whether the point lies inside the box or on its border.
    #[must_use]
    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.west..=self.east).contains(&point.longitude)
            && (self.south..=self.north).contains(&point.latitude)
    }
}

impl FromStr for BoundingBox {
    type Err = ValidationError;

    /// Parses `"west,south,east,north"`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidBoundingBox {
            value: raw.to_owned(),
        };

        let parts = raw
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_parse| invalid())?;

        let [west, south, east, north] = parts.as_slice() else {
            return Err(invalid());
        };

        let bbox = Self {
            west: *west,
            south: *south,
            east: *east,
            north: *north,
        };

        let corners_valid = Coordinates {
            longitude: bbox.west,
            latitude: bbox.south,
        }
        .validate()
        .and_then(|_corner| {
            Coordinates {
                longitude: bbox.east,
                latitude: bbox.north,
            }
            .validate()
        })
        .is_ok();

        if !corners_valid || bbox.west > bbox.east || bbox.south > bbox.north {
            return Err(invalid());
        }

        Ok(bbox)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A single logged waste-collection event.
pub struct WasteRecord {
    /// Identifier assigned at creation.
    pub id: RecordId,
    /// When the waste was collected.
    pub occurred_at: DateTime<Utc>,
    /// Kind of waste.
    pub waste_type: WasteType,
    /// Collected quantity in kilograms.
    pub amount: f64,
    /// Collection point label.
    pub location: String,
    /// Optional position of the collection point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// When the record was stored.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A planned collection assignment.
pub struct CollectionSchedule {
    /// Identifier assigned at creation.
    pub id: ScheduleId,
    /// Day the collection is planned for.
    pub schedule_date: NaiveDate,
    /// Waste stream to collect.
    pub waste_type: ScheduleWasteType,
    /// Repetition interval.
    pub frequency: Frequency,
    /// Handler responsible for the pickup.
    pub assigned_to: String,
    /// Where the pickup takes place.
    pub location: String,
    /// Current progress.
    pub status: ScheduleStatus,
    /// When the schedule was stored.
    pub created_at: DateTime<Utc>,
}

impl CollectionSchedule {
    /// Mark the collection as done. Returns `false` if it already was.
    pub fn mark_complete(&mut self) -> bool {
        let changed = self.status == ScheduleStatus::Pending;
        self.status = ScheduleStatus::Completed;
        changed
    }

    /// Whether the collection is still outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ScheduleStatus::Pending
    }

    /// Whether the collection falls on `today` or later.
    #[must_use]
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.schedule_date >= today
    }

    /// Whether the collection date has passed without completion.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_pending() && self.schedule_date < today
    }
}

/// Half-open UTC window `[date 00:00, date+1 00:00)` covering one calendar day.
#[must_use]
pub fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start
        .checked_add_signed(TimeDelta::days(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}
