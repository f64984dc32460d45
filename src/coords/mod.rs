/// Coordinate notations: conversion between decimal degrees and
/// degree/minute/second angles, display formatting and text parsing.
pub mod entry;
pub mod error;
pub mod parser;

use self::error::FormatError;
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub const DEFAULT_PRECISION: usize = 4;
pub const MAX_PRECISION: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
  N,
  S,
  E,
  W,
}

impl Direction {
  pub fn for_value(decimal: f64, is_latitude: bool) -> Self {
    match (is_latitude, decimal >= 0.0) {
      (true, true) => Direction::N,
      (true, false) => Direction::S,
      (false, true) => Direction::E,
      (false, false) => Direction::W,
    }
  }

  pub fn from_char(c: char) -> Option<Self> {
    match c.to_ascii_uppercase() {
      'N' => Some(Direction::N),
      'S' => Some(Direction::S),
      'E' => Some(Direction::E),
      'W' => Some(Direction::W),
      _ => None,
    }
  }

  pub fn is_latitude(&self) -> bool {
    matches!(self, Direction::N | Direction::S)
  }

  pub fn is_negative(&self) -> bool {
    matches!(self, Direction::S | Direction::W)
  }

  pub fn opposite(&self) -> Self {
    match self {
      Direction::N => Direction::S,
      Direction::S => Direction::N,
      Direction::E => Direction::W,
      Direction::W => Direction::E,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let c = match self {
      Direction::N => 'N',
      Direction::S => 'S',
      Direction::E => 'E',
      Direction::W => 'W',
    };
    write!(f, "{c}")
  }
}

/// Unsigned angle, the hemisphere lives in `direction`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleDMS {
  pub degrees: u32,
  pub minutes: u32,
  pub seconds: f64,
  pub direction: Direction,
}

impl AngleDMS {
  /// Builds an angle from fractional minutes, as written in DDM notation
  pub fn from_decimal_minutes(degrees: u32, minutes: f64, direction: Direction) -> Self {
    let whole = minutes.floor();
    Self {
      degrees,
      minutes: whole as u32,
      seconds: (minutes - whole) * 60.0,
      direction,
    }
  }

  pub fn decimal_minutes(&self) -> f64 {
    self.minutes as f64 + self.seconds / 60.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFormat {
  #[default]
  DD,
  DDM,
  DMS,
}

impl CoordinateFormat {
  pub fn as_str(&self) -> &'static str {
    match self {
      CoordinateFormat::DD => "dd",
      CoordinateFormat::DDM => "ddm",
      CoordinateFormat::DMS => "dms",
    }
  }
}

impl Display for CoordinateFormat {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for CoordinateFormat {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "dd" => Ok(CoordinateFormat::DD),
      "ddm" => Ok(CoordinateFormat::DDM),
      "dms" => Ok(CoordinateFormat::DMS),
      _ => Err(format!("unknown coordinate format {s}, expected dd, ddm or dms")),
    }
  }
}

/// Presentation settings shared by every formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
  pub format: CoordinateFormat,
  pub precision: usize,
}

impl Default for DisplaySettings {
  fn default() -> Self {
    Self {
      format: CoordinateFormat::DD,
      precision: DEFAULT_PRECISION,
    }
  }
}

impl DisplaySettings {
  pub fn format_coordinate(&self, decimal: f64, is_latitude: bool) -> String {
    format_coordinate(decimal, is_latitude, self.format, self.precision)
  }

  pub fn format_point(&self, point: &crate::types::GeoPoint) -> String {
    format!(
      "{} {}",
      self.format_coordinate(point.lat, true),
      self.format_coordinate(point.lng, false)
    )
  }
}

/// Accepts 1 to `MAX_PRECISION` fractional digits
pub fn check_precision(precision: usize) -> Result<usize, FormatError> {
  if (1..=MAX_PRECISION).contains(&precision) {
    Ok(precision)
  } else {
    Err(FormatError::OutOfRange(format!(
      "precision must be between 1 and {MAX_PRECISION}"
    )))
  }
}

pub fn decimal_to_dms(decimal: f64, is_latitude: bool) -> AngleDMS {
  let absolute = decimal.abs();
  let degrees = absolute.floor();
  let minutes_full = (absolute - degrees) * 60.0;
  let minutes = minutes_full.floor();
  let seconds = (minutes_full - minutes) * 60.0;

  AngleDMS {
    degrees: degrees as u32,
    minutes: minutes as u32,
    seconds,
    direction: Direction::for_value(decimal, is_latitude),
  }
}

pub fn dms_to_decimal(angle: &AngleDMS, is_latitude: bool) -> f64 {
  let decimal = angle.degrees as f64 + angle.minutes as f64 / 60.0 + angle.seconds / 3600.0;
  let negate = match angle.direction {
    Direction::S => is_latitude,
    Direction::W => !is_latitude,
    _ => false,
  };
  if negate {
    -decimal
  } else {
    decimal
  }
}

pub fn format_coordinate(
  decimal: f64,
  is_latitude: bool,
  format: CoordinateFormat,
  precision: usize,
) -> String {
  let precision = precision.min(MAX_PRECISION);
  let direction = Direction::for_value(decimal, is_latitude);
  let absolute = decimal.abs();

  match format {
    CoordinateFormat::DD => format!("{:.*}°{}", precision, absolute, direction),
    CoordinateFormat::DDM => {
      let mut degrees = absolute.floor();
      let mut minutes = round_to(absolute.fract() * 60.0, precision);
      if minutes >= 60.0 {
        minutes -= 60.0;
        degrees += 1.0;
      }
      format!("{}°{:.*}'{}", degrees as u32, precision, minutes, direction)
    }
    CoordinateFormat::DMS => {
      let dms = decimal_to_dms(decimal, is_latitude);
      let mut degrees = dms.degrees;
      let mut minutes = dms.minutes;
      let mut seconds = round_to(dms.seconds, precision);
      if seconds >= 60.0 {
        seconds -= 60.0;
        minutes += 1;
      }
      if minutes >= 60 {
        minutes -= 60;
        degrees += 1;
      }
      format!(
        "{}°{}'{:.*}\"{}",
        degrees, minutes, precision, seconds, direction
      )
    }
  }
}

fn round_to(value: f64, precision: usize) -> f64 {
  let factor = 10f64.powi(precision as i32);
  (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decimal_to_dms() {
    let dms = decimal_to_dms(34.0522, true);
    assert_eq!(dms.degrees, 34);
    assert_eq!(dms.minutes, 3);
    assert!((dms.seconds - 7.92).abs() < 1e-6);
    assert_eq!(dms.direction, Direction::N);

    let dms = decimal_to_dms(-118.2437, false);
    assert_eq!(dms.degrees, 118);
    assert_eq!(dms.minutes, 14);
    assert!((dms.seconds - 37.32).abs() < 1e-6);
    assert_eq!(dms.direction, Direction::W);

    assert_eq!(decimal_to_dms(-0.5, true).direction, Direction::S);
    assert_eq!(decimal_to_dms(0.0, false).direction, Direction::E);
  }

  #[test]
  fn test_round_trip() {
    let mut lat = -90.0;
    while lat <= 90.0 {
      let back = dms_to_decimal(&decimal_to_dms(lat, true), true);
      assert!((back - lat).abs() < 1e-6, "{lat} came back as {back}");
      lat += 0.731;
    }
    let mut lng = -180.0;
    while lng <= 180.0 {
      let back = dms_to_decimal(&decimal_to_dms(lng, false), false);
      assert!((back - lng).abs() < 1e-6, "{lng} came back as {back}");
      lng += 1.377;
    }
  }

  #[test]
  fn test_dms_to_decimal_sign() {
    let angle = AngleDMS {
      degrees: 10,
      minutes: 30,
      seconds: 0.0,
      direction: Direction::S,
    };
    assert_eq!(dms_to_decimal(&angle, true), -10.5);
    let angle = AngleDMS {
      direction: Direction::E,
      ..angle
    };
    assert_eq!(dms_to_decimal(&angle, false), 10.5);
  }

  #[test]
  fn test_format_coordinate() {
    assert_eq!(
      format_coordinate(34.0522, true, CoordinateFormat::DD, 4),
      "34.0522°N"
    );
    assert_eq!(
      format_coordinate(-118.2437, false, CoordinateFormat::DD, 2),
      "118.24°W"
    );
    assert_eq!(
      format_coordinate(34.0522, true, CoordinateFormat::DDM, 4),
      "34°3.1320'N"
    );
    assert_eq!(
      format_coordinate(-118.2437, false, CoordinateFormat::DMS, 2),
      "118°14'37.32\"W"
    );
  }

  #[test]
  fn test_format_carries_rounded_seconds() {
    // 10°59'59.99999"
    let value = 10.0 + 59.0 / 60.0 + 59.99999 / 3600.0;
    assert_eq!(
      format_coordinate(value, true, CoordinateFormat::DMS, 2),
      "11°0'0.00\"N"
    );
    assert_eq!(
      format_coordinate(value, true, CoordinateFormat::DDM, 2),
      "11°0.00'N"
    );
  }

  #[test]
  fn test_format_names() {
    assert_eq!("DMS".parse::<CoordinateFormat>(), Ok(CoordinateFormat::DMS));
    assert!("utm".parse::<CoordinateFormat>().is_err());
    assert_eq!(CoordinateFormat::default(), CoordinateFormat::DD);
    let settings = DisplaySettings::default();
    assert_eq!(settings.precision, 4);
    let point = crate::types::GeoPoint {
      lat: -33.9,
      lng: 151.2,
    };
    assert_eq!(settings.format_point(&point), "33.9000°S 151.2000°E");
  }

  #[test]
  fn test_from_decimal_minutes() {
    let angle = AngleDMS::from_decimal_minutes(34, 3.132, Direction::N);
    assert_eq!(angle.minutes, 3);
    assert!((angle.seconds - 7.92).abs() < 1e-6);
    assert!((angle.decimal_minutes() - 3.132).abs() < 1e-9);
  }
}
