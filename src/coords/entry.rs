use super::{dms_to_decimal, error::FormatError, AngleDMS, CoordinateFormat, Direction};
use crate::types::GeoPoint;
use serde::Deserialize;

/// One signed numeric field group per axis, as typed in the manual
/// entry form. The sign of the degrees selects the hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AxisEntry {
  pub degrees: f64,
  #[serde(default)]
  pub minutes: f64,
  #[serde(default)]
  pub seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ManualEntry {
  pub format: CoordinateFormat,
  pub lat: AxisEntry,
  pub lng: AxisEntry,
}

impl ManualEntry {
  pub fn validate(&self) -> Result<GeoPoint, FormatError> {
    validate_components(self.format, &self.lat, &self.lng)
  }
}

/// Range-checks the fields for the given format and builds the point
pub fn validate_components(
  format: CoordinateFormat,
  lat: &AxisEntry,
  lng: &AxisEntry,
) -> Result<GeoPoint, FormatError> {
  check_axis(format, lat, "Latitude", 90.0)?;
  check_axis(format, lng, "Longitude", 180.0)?;

  match format {
    CoordinateFormat::DD => GeoPoint::new(lat.degrees, lng.degrees),
    CoordinateFormat::DDM | CoordinateFormat::DMS => {
      let lat = to_angle(format, lat, true);
      let lng = to_angle(format, lng, false);
      GeoPoint::new(dms_to_decimal(&lat, true), dms_to_decimal(&lng, false))
    }
  }
}

fn check_axis(
  format: CoordinateFormat,
  entry: &AxisEntry,
  axis: &str,
  max_degrees: f64,
) -> Result<(), FormatError> {
  if !entry.degrees.is_finite() || entry.degrees.abs() > max_degrees {
    return Err(FormatError::OutOfRange(format!(
      "{axis} degrees must be between -{max_degrees}° and {max_degrees}°"
    )));
  }
  if format == CoordinateFormat::DD {
    return Ok(());
  }
  if entry.degrees.fract() != 0.0 {
    return Err(FormatError::OutOfRange(format!(
      "{axis} degrees must be a whole number in {format} format"
    )));
  }
  if !(0.0..60.0).contains(&entry.minutes) {
    return Err(FormatError::OutOfRange(format!(
      "{axis} minutes must be between 0 and 59"
    )));
  }
  if format == CoordinateFormat::DMS {
    if entry.minutes.fract() != 0.0 {
      return Err(FormatError::OutOfRange(format!(
        "{axis} minutes must be a whole number in dms format"
      )));
    }
    if !(0.0..60.0).contains(&entry.seconds) {
      return Err(FormatError::OutOfRange(format!(
        "{axis} seconds must be between 0 and 59.999"
      )));
    }
  }
  Ok(())
}

fn to_angle(format: CoordinateFormat, entry: &AxisEntry, is_latitude: bool) -> AngleDMS {
  // -0 degrees still means the southern/western hemisphere
  let negative = entry.degrees.is_sign_negative();
  let direction = Direction::for_value(if negative { -1.0 } else { 1.0 }, is_latitude);
  let degrees = entry.degrees.abs() as u32;
  match format {
    CoordinateFormat::DDM => AngleDMS::from_decimal_minutes(degrees, entry.minutes, direction),
    _ => AngleDMS {
      degrees,
      minutes: entry.minutes as u32,
      seconds: entry.seconds,
      direction,
    },
  }
}
