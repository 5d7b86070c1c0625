//! Annotated point domain model.
//!
//! # Responsibility
//! - Define the canonical map-point record shared by every caller.
//! - Enforce field validation before a point can exist at all.
//!
//! # Invariants
//! - `id` is stable and never reused for another point.
//! - `name` is non-empty after trimming.
//! - Coordinates are finite and inside [-90, 90] x [-180, 180].
//!
//! # See also
//! - `model::catalog` for the shared baseline sequence.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every annotated point.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PointId = Uuid;

/// Tolerance for place-equality on each coordinate component.
///
/// Two coordinates closer than this on both axes are treated as the same
/// physical place, independent of which record identifier carries them.
pub const COORDINATE_EPSILON: f64 = 1e-6;

/// Validation error for point construction and UI field parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum PointValidationError {
    /// Display name is empty or whitespace-only.
    EmptyName,
    /// Latitude is non-finite or outside [-90, 90].
    LatitudeOutOfRange(f64),
    /// Longitude is non-finite or outside [-180, 180].
    LongitudeOutOfRange(f64),
    /// A UI-supplied numeric string could not be parsed as a coordinate.
    UnparseableCoordinate { field: &'static str, value: String },
}

impl Display for PointValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "point name cannot be empty"),
            Self::LatitudeOutOfRange(value) => {
                write!(f, "latitude {value} is not a finite value in [-90, 90]")
            }
            Self::LongitudeOutOfRange(value) => {
                write!(f, "longitude {value} is not a finite value in [-180, 180]")
            }
            Self::UnparseableCoordinate { field, value } => {
                write!(f, "cannot parse {field} from `{value}`")
            }
        }
    }
}

impl Error for PointValidationError {}

/// Validated geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate, rejecting non-finite or out-of-range components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PointValidationError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(PointValidationError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(PointValidationError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses coordinate text from UI input fields.
    ///
    /// # Errors
    /// - `UnparseableCoordinate` when either string is not a number.
    /// - Range errors from [`Coordinate::new`] for parsed values.
    pub fn parse(lat_text: &str, lon_text: &str) -> Result<Self, PointValidationError> {
        let latitude = lat_text.trim().parse::<f64>().map_err(|_| {
            PointValidationError::UnparseableCoordinate {
                field: "latitude",
                value: lat_text.to_string(),
            }
        })?;
        let longitude = lon_text.trim().parse::<f64>().map_err(|_| {
            PointValidationError::UnparseableCoordinate {
                field: "longitude",
                value: lon_text.to_string(),
            }
        })?;
        Self::new(latitude, longitude)
    }

    /// Component-wise closeness within [`COORDINATE_EPSILON`].
    pub fn approx_eq(&self, other: &Coordinate) -> bool {
        (self.latitude - other.latitude).abs() < COORDINATE_EPSILON
            && (self.longitude - other.longitude).abs() < COORDINATE_EPSILON
    }
}

/// Canonical annotated map point.
///
/// Two equality notions apply and are used by different operations:
/// identity equality (`id` match, used by update/remove) and
/// place-equality (`same_place`, used by merge/dedup).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPoint {
    /// Stable global ID, generated at creation and immutable thereafter.
    pub id: PointId,
    /// Non-empty display name.
    pub name: String,
    /// Free-text description; may be empty.
    pub description: String,
    /// Opaque display-icon key resolved by the host UI.
    pub icon_ref: String,
    /// Validated geographic position.
    pub coordinate: Coordinate,
}

impl AnnotatedPoint {
    /// Creates a new point with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        icon_ref: impl Into<String>,
        coordinate: Coordinate,
    ) -> Result<Self, PointValidationError> {
        Self::with_id(Uuid::new_v4(), name, description, icon_ref, coordinate)
    }

    /// Creates a point with a caller-provided stable ID.
    ///
    /// Used by decode/import paths where identity already exists externally.
    pub fn with_id(
        id: PointId,
        name: impl Into<String>,
        description: impl Into<String>,
        icon_ref: impl Into<String>,
        coordinate: Coordinate,
    ) -> Result<Self, PointValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PointValidationError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            icon_ref: icon_ref.into(),
            coordinate,
        })
    }

    /// Re-checks field invariants on an existing point.
    ///
    /// Fields are public for caller ergonomics, so write paths call this
    /// before trusting a point that may have been edited in place.
    pub fn validate(&self) -> Result<(), PointValidationError> {
        if self.name.trim().is_empty() {
            return Err(PointValidationError::EmptyName);
        }
        Coordinate::new(self.coordinate.latitude, self.coordinate.longitude)?;
        Ok(())
    }

    /// Place-equality: same name and coordinates within tolerance.
    ///
    /// Deliberately ignores `id`, `description` and `icon_ref` so a
    /// re-added or re-decoded point still dedups against the baseline.
    pub fn same_place(&self, other: &AnnotatedPoint) -> bool {
        self.name == other.name && self.coordinate.approx_eq(&other.coordinate)
    }
}
