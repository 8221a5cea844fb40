//! Caller-shaped input documents and their conversion into typed entities.
//!
//! Inputs arrive loosely typed (every field optional, amounts as numbers or
//! numeric strings). Validation happens once, here, before anything reaches a
//! store.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    CollectionSchedule, Coordinates, Frequency, RecordId, ScheduleId, ScheduleStatus,
    ScheduleWasteType, WasteRecord, WasteType,
};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
/// A required field is missing or malformed.
pub enum ValidationError {
    /// Field was not supplied.
    #[error("{field} is required")]
    Missing {
        /// Offending field.
        field: &'static str,
    },
    /// Field was supplied but blank.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending field.
        field: &'static str,
    },
    /// Field should hold a finite number.
    #[error("{field} must be a number, got {value:?}")]
    NotNumeric {
        /// Offending field.
        field: &'static str,
        /// Raw input.
        value: String,
    },
    /// Field must be zero or positive.
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Offending field.
        field: &'static str,
        /// Parsed input.
        value: f64,
    },
    /// Value outside a closed enumeration.
    #[error("{field} has unknown value {value:?}")]
    UnknownVariant {
        /// Offending field.
        field: &'static str,
        /// Raw input.
        value: String,
    },
    /// Value is not a recognised date or timestamp.
    #[error("{field} is not a valid date: {value:?}")]
    InvalidDate {
        /// Offending field.
        field: &'static str,
        /// Raw input.
        value: String,
    },
    /// Numeric value outside its allowed range.
    #[error("{field} is out of range: {value}")]
    OutOfRange {
        /// Offending field.
        field: &'static str,
        /// Parsed input.
        value: f64,
    },
    /// Bounding box is not four ordered, in-range numbers.
    #[error("bbox must be \"west,south,east,north\", got {value:?}")]
    InvalidBoundingBox {
        /// Raw input.
        value: String,
    },
}

impl ValidationError {
    /// Name of the field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::Empty { field }
            | Self::NotNumeric { field, .. }
            | Self::Negative { field, .. }
            | Self::UnknownVariant { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::OutOfRange { field, .. } => field,
            Self::InvalidBoundingBox { .. } => "bbox",
        }
    }
}

/// Largest accepted amount. Totals over any realistic number of records stay
/// finite and can still be scaled to cents.
pub const MAX_AMOUNT: f64 = 1.0e12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
/// Amount as sent by clients: a JSON number or a numeric string such as `"5.00"`.
pub enum AmountInput {
    /// Plain JSON number.
    Number(f64),
    /// Number encoded as text.
    Text(String),
}

impl AmountInput {
    fn parse(&self, field: &'static str) -> Result<f64, ValidationError> {
        let value = match self {
            Self::Number(value) => *value,
            Self::Text(raw) => {
                raw.trim()
                    .parse::<f64>()
                    .map_err(|_parse| ValidationError::NotNumeric {
                        field,
                        value: raw.clone(),
                    })?
            }
        };

        if !value.is_finite() {
            return Err(ValidationError::NotNumeric {
                field,
                value: value.to_string(),
            });
        }
        if value < 0.0 {
            return Err(ValidationError::Negative { field, value });
        }
        if value > MAX_AMOUNT {
            return Err(ValidationError::OutOfRange { field, value });
        }
        Ok(value)
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Unvalidated waste record submission.
pub struct RecordInput {
    /// Collection timestamp; `YYYY-MM-DD`, naive ISO datetime, or RFC 3339.
    #[serde(alias = "date")]
    pub occurred_at: Option<String>,
    /// Waste type name.
    #[serde(alias = "type")]
    pub waste_type: Option<String>,
    /// Quantity in kilograms.
    #[serde(alias = "weight")]
    pub amount: Option<AmountInput>,
    /// Collection point label.
    pub location: Option<String>,
    /// Optional collection point position.
    pub coordinates: Option<Coordinates>,
    /// Free-form notes.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Validated record fields still lacking identity.
pub struct RecordDraft {
    /// When the waste was collected.
    pub occurred_at: DateTime<Utc>,
    /// Kind of waste.
    pub waste_type: WasteType,
    /// Quantity in kilograms.
    pub amount: f64,
    /// Collection point label.
    pub location: String,
    /// Optional collection point position.
    pub coordinates: Option<Coordinates>,
    /// Free-form notes.
    pub notes: String,
}

impl RecordInput {
    /// Validate every field and produce a draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking fields in the
    /// order timestamp, type, amount, location, coordinates.
    pub fn validate(self) -> Result<RecordDraft, ValidationError> {
        let occurred_at = parse_timestamp("occurredAt", &required("occurredAt", self.occurred_at)?)?;
        let waste_type = parse_variant("wasteType", &required("wasteType", self.waste_type)?)?;
        let amount = self
            .amount
            .ok_or(ValidationError::Missing { field: "amount" })?
            .parse("amount")?;
        let location = required("location", self.location)?;
        let coordinates = self.coordinates.map(Coordinates::validate).transpose()?;

        Ok(RecordDraft {
            occurred_at,
            waste_type,
            amount,
            location,
            coordinates,
            notes: self.notes.unwrap_or_default(),
        })
    }
}

impl RecordDraft {
    /// Attach identity and storage time.
    #[must_use]
    pub fn into_record(self, id: RecordId, created_at: DateTime<Utc>) -> WasteRecord {
        WasteRecord {
            id,
            occurred_at: self.occurred_at,
            waste_type: self.waste_type,
            amount: self.amount,
            location: self.location,
            coordinates: self.coordinates,
            notes: self.notes,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Unvalidated collection schedule submission.
pub struct ScheduleInput {
    /// Planned day, `YYYY-MM-DD`.
    pub schedule_date: Option<String>,
    /// Waste stream name.
    #[serde(alias = "scheduleType")]
    pub waste_type: Option<String>,
    /// Repetition interval; weekly when omitted.
    pub frequency: Option<String>,
    /// Responsible handler.
    pub assigned_to: Option<String>,
    /// Pickup location.
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Validated schedule fields still lacking identity.
pub struct ScheduleDraft {
    /// Planned day.
    pub schedule_date: NaiveDate,
    /// Waste stream.
    pub waste_type: ScheduleWasteType,
    /// Repetition interval.
    pub frequency: Frequency,
    /// Responsible handler.
    pub assigned_to: String,
    /// Pickup location.
    pub location: String,
}

impl ScheduleInput {
    /// Validate every field and produce a draft.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(self) -> Result<ScheduleDraft, ValidationError> {
        let schedule_date =
            parse_date("scheduleDate", &required("scheduleDate", self.schedule_date)?)?;
        let waste_type = parse_variant("wasteType", &required("wasteType", self.waste_type)?)?;
        let frequency = match self.frequency {
            Some(raw) => parse_variant("frequency", &raw)?,
            None => Frequency::default(),
        };
        let assigned_to = required("assignedTo", self.assigned_to)?;
        let location = required("location", self.location)?;

        Ok(ScheduleDraft {
            schedule_date,
            waste_type,
            frequency,
            assigned_to,
            location,
        })
    }
}

impl ScheduleDraft {
    /// Attach identity and storage time; new schedules start pending.
    #[must_use]
    pub fn into_schedule(self, id: ScheduleId, created_at: DateTime<Utc>) -> CollectionSchedule {
        CollectionSchedule {
            id,
            schedule_date: self.schedule_date,
            waste_type: self.waste_type,
            frequency: self.frequency,
            assigned_to: self.assigned_to,
            location: self.location,
            status: ScheduleStatus::Pending,
            created_at,
        }
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    let value = value.ok_or(ValidationError::Missing { field })?;
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(value)
}

/// Parse a member of a closed enumeration by its exact name.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownVariant`] for any other string.
pub fn parse_variant<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ValidationError> {
    raw.parse().map_err(|_parse| ValidationError::UnknownVariant {
        field,
        value: raw.to_owned(),
    })
}

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when the string is not a real date.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_parse| {
        ValidationError::InvalidDate {
            field,
            value: raw.to_owned(),
        }
    })
}

/// Parse a timestamp, normalising to UTC.
///
/// Accepts RFC 3339 (offset applied), `YYYY-MM-DDTHH:MM:SS[.fff]` or
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC), and a bare `YYYY-MM-DD` (midnight UTC).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidDate`] when no form matches.
pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed.and_utc());
        }
    }

    parse_date(field, trimmed)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_invalid| ValidationError::InvalidDate {
            field,
            value: raw.to_owned(),
        })
}
