//! Persistence codec for the per-identity custom point list.
//!
//! # Responsibility
//! - Serialize custom points to the JSON byte layout stored per identity.
//! - Rebuild validated points from persisted bytes.
//!
//! # Invariants
//! - Only custom entries are ever encoded; the baseline catalog has no
//!   wire representation.
//! - Decode drops individual invalid records instead of failing the
//!   whole payload; only a malformed top-level document is fatal.

use crate::model::point::{AnnotatedPoint, Coordinate, PointId};
use log::warn;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Codec error for the persisted point-list byte layout.
#[derive(Debug)]
pub enum CodecError {
    /// Payload is not a well-formed JSON point list.
    Malformed(String),
    /// Serialization failed; carries the underlying serializer message.
    Encode(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed point list payload: {message}"),
            Self::Encode(message) => write!(f, "cannot encode point list: {message}"),
        }
    }
}

impl Error for CodecError {}

/// Wire record for one annotated point.
///
/// Field names match the external schema: coordinates are flattened and
/// the icon key is camelCase.
#[derive(Debug, Serialize, Deserialize)]
struct PointRecord {
    id: PointId,
    name: String,
    description: String,
    #[serde(rename = "iconRef")]
    icon_ref: String,
    latitude: f64,
    longitude: f64,
}

impl From<&AnnotatedPoint> for PointRecord {
    fn from(point: &AnnotatedPoint) -> Self {
        Self {
            id: point.id,
            name: point.name.clone(),
            description: point.description.clone(),
            icon_ref: point.icon_ref.clone(),
            latitude: point.coordinate.latitude,
            longitude: point.coordinate.longitude,
        }
    }
}

/// Encodes an ordered custom point list to its persisted byte layout.
pub fn encode(points: &[AnnotatedPoint]) -> CodecResult<Vec<u8>> {
    let records: Vec<PointRecord> = points.iter().map(PointRecord::from).collect();
    serde_json::to_vec(&records).map_err(|err| CodecError::Encode(err.to_string()))
}

/// Decodes a persisted byte payload back into validated points.
///
/// Records failing field validation are skipped with a warn log so one
/// corrupt entry cannot take the rest of an identity's data with it.
pub fn decode(bytes: &[u8]) -> CodecResult<Vec<AnnotatedPoint>> {
    let records: Vec<PointRecord> =
        serde_json::from_slice(bytes).map_err(|err| CodecError::Malformed(err.to_string()))?;

    let mut points = Vec::with_capacity(records.len());
    for record in records {
        match rebuild(record) {
            Ok(point) => points.push(point),
            Err((id, err)) => {
                warn!(
                    "event=point_decode module=codec status=skipped id={id} error={err}"
                );
            }
        }
    }
    Ok(points)
}

fn rebuild(record: PointRecord) -> Result<AnnotatedPoint, (PointId, String)> {
    let coordinate = Coordinate::new(record.latitude, record.longitude)
        .map_err(|err| (record.id, err.to_string()))?;
    AnnotatedPoint::with_id(
        record.id,
        record.name,
        record.description,
        record.icon_ref,
        coordinate,
    )
    .map_err(|err| (record.id, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, CodecError};
    use crate::model::point::{AnnotatedPoint, Coordinate};

    fn point(name: &str, lat: f64, lon: f64) -> AnnotatedPoint {
        AnnotatedPoint::new(name, "desc", "pin", Coordinate::new(lat, lon).unwrap()).unwrap()
    }

    #[test]
    fn wire_layout_uses_flat_coordinates_and_camel_case_icon_key() {
        let bytes = encode(&[point("Home", 22.0, 114.0)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\"iconRef\""));
        assert!(text.contains("\"latitude\""));
        assert!(text.contains("\"longitude\""));
        assert!(!text.contains("coordinate"));
    }

    #[test]
    fn garbage_payload_is_malformed() {
        let err = decode(b"not json at all").unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn invalid_record_is_dropped_not_fatal() {
        let payload = br#"[
            {"id":"00000000-0000-4000-8000-000000000001","name":"Valid","description":"","iconRef":"pin","latitude":22.0,"longitude":114.0},
            {"id":"00000000-0000-4000-8000-000000000002","name":"","description":"","iconRef":"pin","latitude":22.0,"longitude":114.0},
            {"id":"00000000-0000-4000-8000-000000000003","name":"OutOfRange","description":"","iconRef":"pin","latitude":95.0,"longitude":114.0}
        ]"#;
        let points = decode(payload).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].name, "Valid");
    }
}
