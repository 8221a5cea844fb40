//! API request and response types.
//!
//! Entities are serialized as-is; these types cover what the core does not
//! model itself: health, errors, and query strings.

use serde::{Deserialize, Serialize};
use wastelog_core::{
    model::BoundingBox,
    ports::{RecordFilter, RecordOrder},
    validation::{ValidationError, parse_timestamp, parse_variant},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response of `GET /api/health`.
pub struct ApiHealth {
    /// Always `true` when the server answers.
    pub healthy: bool,
    /// Crate version.
    pub version: String,
    /// Active store backend.
    pub store: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Error body returned with every non-2xx response.
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Offending input field, for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    /// Error without a field reference.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
        }
    }

    /// Error pointing at an input field.
    #[must_use]
    pub fn for_field(error: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: Some(field.into()),
        }
    }
}

impl From<&ValidationError> for ApiError {
    fn from(err: &ValidationError) -> Self {
        Self::for_field(err.to_string(), err.field())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Query parameters for `GET /api/records`.
pub struct RecordQueryParams {
    /// `insertion` (default) or `newest`.
    pub sort: Option<String>,
    /// Earliest timestamp, inclusive.
    pub from: Option<String>,
    /// Latest timestamp, exclusive.
    pub to: Option<String>,
    /// Exact waste type name.
    pub waste_type: Option<String>,
    /// Exact location label.
    pub location: Option<String>,
    /// Bounding box as `west,south,east,north`.
    pub bbox: Option<String>,
}

impl RecordQueryParams {
    /// Convert the raw parameters into a typed filter and ordering.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for any malformed parameter.
    pub fn into_query(self) -> Result<(RecordFilter, RecordOrder), ValidationError> {
        let order: RecordOrder = self
            .sort
            .as_deref()
            .map(|raw| parse_variant("sort", raw))
            .transpose()?
            .unwrap_or_default();

        let filter = RecordFilter {
            from: self
                .from
                .as_deref()
                .map(|raw| parse_timestamp("from", raw))
                .transpose()?,
            to: self
                .to
                .as_deref()
                .map(|raw| parse_timestamp("to", raw))
                .transpose()?,
            waste_type: self
                .waste_type
                .as_deref()
                .map(|raw| parse_variant("wasteType", raw))
                .transpose()?,
            location: self.location,
            bbox: self
                .bbox
                .as_deref()
                .map(str::parse::<BoundingBox>)
                .transpose()?,
        };

        Ok((filter, order))
    }
}

#[cfg(test)]
mod tests {
    use wastelog_core::model::WasteType;

    use super::*;

    #[test]
    fn empty_params_match_everything_in_insertion_order() {
        let (filter, order) = RecordQueryParams::default()
            .into_query()
            .expect("valid query");
        assert_eq!(filter, RecordFilter::default());
        assert_eq!(order, RecordOrder::Insertion);
    }

    #[test]
    fn parses_all_parameters() {
        let params = RecordQueryParams {
            sort: Some("newest".to_owned()),
            from: Some("2024-03-01".to_owned()),
            to: Some("2024-03-02T12:00:00Z".to_owned()),
            waste_type: Some("Hazardous".to_owned()),
            location: Some("Lab".to_owned()),
            bbox: Some("1,2,3,4".to_owned()),
        };
        let (filter, order) = params.into_query().expect("valid query");
        assert_eq!(order, RecordOrder::Newest);
        assert_eq!(filter.waste_type, Some(WasteType::Hazardous));
        assert_eq!(filter.location.as_deref(), Some("Lab"));
        assert!(filter.from.is_some() && filter.to.is_some());
        assert!(filter.bbox.is_some());
    }

    #[test]
    fn malformed_parameters_name_their_field() {
        let bad_sort = RecordQueryParams {
            sort: Some("oldest".to_owned()),
            ..RecordQueryParams::default()
        };
        assert_eq!(bad_sort.into_query().expect_err("bad sort").field(), "sort");

        let bad_bbox = RecordQueryParams {
            bbox: Some("1,2".to_owned()),
            ..RecordQueryParams::default()
        };
        assert_eq!(bad_bbox.into_query().expect_err("bad bbox").field(), "bbox");
    }
}
