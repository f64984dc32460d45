use crate::coords::error::FormatError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
  pub lat: f64,
  pub lng: f64,
}

impl GeoPoint {
  /// Builds a point, rejecting values outside [-90,90] / [-180,180]
  pub fn new(lat: f64, lng: f64) -> Result<Self, FormatError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
      return Err(FormatError::OutOfRange(format!(
        "latitude {lat} must be between -90 and 90"
      )));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
      return Err(FormatError::OutOfRange(format!(
        "longitude {lng} must be between -180 and 180"
      )));
    }
    Ok(Self { lat, lng })
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LocationRole {
  Fire,
  Base,
}

impl LocationRole {
  pub fn storage_key(&self) -> &'static str {
    match self {
      LocationRole::Fire => "fmf-fire-location",
      LocationRole::Base => "fmf-base-location",
    }
  }
}

impl Display for LocationRole {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      LocationRole::Fire => write!(f, "fire"),
      LocationRole::Base => write!(f, "base"),
    }
  }
}

impl std::str::FromStr for LocationRole {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "fire" => Ok(LocationRole::Fire),
      "base" => Ok(LocationRole::Base),
      _ => Err(format!("unknown location role {s}, expected fire or base")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_point_range() {
    assert!(GeoPoint::new(34.05, -118.24).is_ok());
    assert!(GeoPoint::new(90.0, 180.0).is_ok());
    assert!(GeoPoint::new(90.1, 0.0).is_err());
    assert!(GeoPoint::new(0.0, -180.5).is_err());
    assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
  }

  #[test]
  fn test_role() {
    assert_eq!("Fire".parse::<LocationRole>(), Ok(LocationRole::Fire));
    assert!("tanker".parse::<LocationRole>().is_err());
    assert_eq!(LocationRole::Base.storage_key(), "fmf-base-location");
  }
}
