use super::{decimal_to_dms, dms_to_decimal, error::FormatError, AngleDMS, CoordinateFormat, Direction};
use crate::types::GeoPoint;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;

lazy_static! {
  // tried in this order, first match wins
  static ref DMS_PAIR: Regex = Regex::new(
    r#"(?i)(\d+)°(\d+)'(\d+(?:\.\d+)?)?"?([NS])[\s,]+(\d+)°(\d+)'(\d+(?:\.\d+)?)?"?([EW])"#
  )
  .unwrap();
  static ref DDM_PAIR: Regex =
    Regex::new(r"(?i)(\d+)°(\d+(?:\.\d+)?)'([NS])[\s,]+(\d+)°(\d+(?:\.\d+)?)'([EW])").unwrap();
  static ref DD_PAIR: Regex =
    Regex::new(r"(?i)([+-]?\d+(?:\.\d+)?)°?([NS])[\s,]+([+-]?\d+(?:\.\d+)?)°?([EW])").unwrap();
}

/// Parses a single `D°M'S"X` angle, X being the hemisphere letter
pub fn parse_angle_string(text: &str) -> Result<AngleDMS, FormatError> {
  let text = text.trim();
  let last = text.chars().last().ok_or(FormatError::InvalidDirection)?;
  let direction = Direction::from_char(last).ok_or(FormatError::InvalidDirection)?;
  let body = text[..text.len() - last.len_utf8()].trim();

  let (deg, rest) = split_once_exact(body, '°').ok_or(FormatError::MissingDegreeSymbol)?;
  let (min, sec) = split_once_exact(rest, '\'').ok_or(FormatError::MissingMinuteSymbol)?;

  let degrees = parse_number::<i64>(deg)?;
  let minutes = parse_number::<i64>(min)?;
  let sec = sec.replacen('"', "", 1);
  let seconds = if sec.trim().is_empty() {
    0.0
  } else {
    parse_number::<f64>(&sec)?
  };

  let (axis, max_degrees) = if direction.is_latitude() {
    ("latitude", 90)
  } else {
    ("longitude", 180)
  };
  if !(0..=max_degrees).contains(&degrees) {
    return Err(FormatError::OutOfRange(format!(
      "{axis} degrees must be between 0 and {max_degrees}"
    )));
  }
  if !(0..60).contains(&minutes) {
    return Err(FormatError::OutOfRange("minutes must be less than 60".into()));
  }
  if !(0.0..60.0).contains(&seconds) {
    return Err(FormatError::OutOfRange("seconds must be less than 60".into()));
  }

  Ok(AngleDMS {
    degrees: degrees as u32,
    minutes: minutes as u32,
    seconds,
    direction,
  })
}

pub fn parse_coordinate_pair(lat_text: &str, lng_text: &str) -> Result<GeoPoint, FormatError> {
  parse_pair_inner(lat_text, lng_text).map_err(|err| FormatError::InvalidPair(Box::new(err)))
}

fn parse_pair_inner(lat_text: &str, lng_text: &str) -> Result<GeoPoint, FormatError> {
  let lat = parse_angle_string(lat_text)?;
  let lng = parse_angle_string(lng_text)?;
  angles_to_point(&lat, &lng)
}

/// Converts a lat/lng angle pair to a point, checking axes and ranges
pub fn angles_to_point(lat: &AngleDMS, lng: &AngleDMS) -> Result<GeoPoint, FormatError> {
  if !lat.direction.is_latitude() {
    return Err(FormatError::LatitudeDirection);
  }
  if lng.direction.is_latitude() {
    return Err(FormatError::LongitudeDirection);
  }
  if lat.minutes >= 60 || lng.minutes >= 60 {
    return Err(FormatError::OutOfRange("minutes must be less than 60".into()));
  }
  if !(0.0..60.0).contains(&lat.seconds) || !(0.0..60.0).contains(&lng.seconds) {
    return Err(FormatError::OutOfRange("seconds must be less than 60".into()));
  }
  GeoPoint::new(dms_to_decimal(lat, true), dms_to_decimal(lng, false))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FreeTextParse {
  Parsed {
    format: CoordinateFormat,
    lat: AngleDMS,
    lng: AngleDMS,
  },
  Failed {
    reason: String,
  },
}

impl FreeTextParse {
  fn failed(reason: &str) -> Self {
    FreeTextParse::Failed {
      reason: reason.to_owned(),
    }
  }

  pub fn is_parsed(&self) -> bool {
    matches!(self, FreeTextParse::Parsed { .. })
  }

  pub fn detected_format(&self) -> Option<CoordinateFormat> {
    match self {
      FreeTextParse::Parsed { format, .. } => Some(*format),
      FreeTextParse::Failed { .. } => None,
    }
  }

  pub fn to_point(&self) -> Result<GeoPoint, FormatError> {
    match self {
      FreeTextParse::Parsed { lat, lng, .. } => angles_to_point(lat, lng),
      FreeTextParse::Failed { reason } => Err(FormatError::InvalidPair(Box::new(
        FormatError::InvalidNumber(reason.clone()),
      ))),
    }
  }
}

/// Detects DMS, DDM or DD notation in untrusted text.
/// Never fails hard, an unrecognised input comes back as `Failed`.
pub fn parse_free_text(text: &str) -> FreeTextParse {
  if text.trim().is_empty() {
    return FreeTextParse::failed("no input provided");
  }

  if let Some(caps) = DMS_PAIR.captures(text) {
    return match (dms_from_caps(&caps, 1), dms_from_caps(&caps, 5)) {
      (Some(lat), Some(lng)) => FreeTextParse::Parsed {
        format: CoordinateFormat::DMS,
        lat,
        lng,
      },
      _ => FreeTextParse::failed("invalid DMS format"),
    };
  }

  if let Some(caps) = DDM_PAIR.captures(text) {
    return match (ddm_from_caps(&caps, 1), ddm_from_caps(&caps, 4)) {
      (Some(lat), Some(lng)) => FreeTextParse::Parsed {
        format: CoordinateFormat::DDM,
        lat,
        lng,
      },
      _ => FreeTextParse::failed("invalid DDM format"),
    };
  }

  if let Some(caps) = DD_PAIR.captures(text) {
    return match (dd_from_caps(&caps, 1), dd_from_caps(&caps, 3)) {
      (Some(lat), Some(lng)) => FreeTextParse::Parsed {
        format: CoordinateFormat::DD,
        lat,
        lng,
      },
      _ => FreeTextParse::failed("invalid DD format"),
    };
  }

  FreeTextParse::failed("could not parse coordinates, please use DD, DDM, or DMS format")
}

fn dms_from_caps(caps: &Captures, first: usize) -> Option<AngleDMS> {
  let degrees = caps.get(first)?.as_str().parse().ok()?;
  let minutes = caps.get(first + 1)?.as_str().parse().ok()?;
  let seconds = match caps.get(first + 2) {
    Some(m) => m.as_str().parse().ok()?,
    None => 0.0,
  };
  let direction = direction_from_caps(caps, first + 3)?;
  Some(AngleDMS {
    degrees,
    minutes,
    seconds,
    direction,
  })
}

fn ddm_from_caps(caps: &Captures, first: usize) -> Option<AngleDMS> {
  let degrees = caps.get(first)?.as_str().parse().ok()?;
  let minutes: f64 = caps.get(first + 1)?.as_str().parse().ok()?;
  let direction = direction_from_caps(caps, first + 2)?;
  Some(AngleDMS::from_decimal_minutes(degrees, minutes, direction))
}

fn dd_from_caps(caps: &Captures, first: usize) -> Option<AngleDMS> {
  let value: f64 = caps.get(first)?.as_str().parse().ok()?;
  let direction = direction_from_caps(caps, first + 1)?;
  let mut angle = decimal_to_dms(value, direction.is_latitude());
  // the letter gives the hemisphere, a leading minus flips it
  angle.direction = if value < 0.0 {
    direction.opposite()
  } else {
    direction
  };
  Some(angle)
}

fn direction_from_caps(caps: &Captures, idx: usize) -> Option<Direction> {
  caps.get(idx)?.as_str().chars().next().and_then(Direction::from_char)
}

fn split_once_exact(text: &str, sep: char) -> Option<(&str, &str)> {
  let (head, tail) = text.split_once(sep)?;
  if tail.contains(sep) {
    None
  } else {
    Some((head, tail))
  }
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T, FormatError> {
  let text = text.trim();
  text
    .parse::<T>()
    .map_err(|_| FormatError::InvalidNumber(text.to_owned()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_angle() {
    let angle = parse_angle_string("34°3'7.92\"N").unwrap();
    assert_eq!(angle.degrees, 34);
    assert_eq!(angle.minutes, 3);
    assert!((angle.seconds - 7.92).abs() < 1e-9);
    assert_eq!(angle.direction, Direction::N);

    let angle = parse_angle_string("  118° 14' 37.32\" w ").unwrap();
    assert_eq!(angle.degrees, 118);
    assert_eq!(angle.direction, Direction::W);

    let angle = parse_angle_string("45°30'S").unwrap();
    assert_eq!(angle.seconds, 0.0);
  }

  #[test]
  fn test_parse_angle_errors() {
    assert_eq!(parse_angle_string("34°3'7\"X"), Err(FormatError::InvalidDirection));
    assert_eq!(parse_angle_string(""), Err(FormatError::InvalidDirection));
    assert_eq!(parse_angle_string("34 3'7\"N"), Err(FormatError::MissingDegreeSymbol));
    assert_eq!(parse_angle_string("34°3 7\"N"), Err(FormatError::MissingMinuteSymbol));
    assert!(matches!(
      parse_angle_string("ab°3'7\"N"),
      Err(FormatError::InvalidNumber(_))
    ));

    let err = parse_angle_string("91°0'0\"N").unwrap_err();
    assert!(err.is_range_error());
    assert!(parse_angle_string("180°0'0\"E").is_ok());
    assert!(parse_angle_string("181°0'0\"E").unwrap_err().is_range_error());
    assert!(parse_angle_string("10°60'0\"E").unwrap_err().is_range_error());
    assert!(parse_angle_string("10°0'60\"E").unwrap_err().is_range_error());
  }

  #[test]
  fn test_parse_pair() {
    let point = parse_coordinate_pair("34°3'7.92\"N", "118°14'37.32\"W").unwrap();
    assert!((point.lat - 34.0522).abs() < 1e-4);
    assert!((point.lng + 118.2437).abs() < 1e-4);

    let err = parse_coordinate_pair("118°14'37.32\"W", "34°3'7.92\"N").unwrap_err();
    assert_eq!(
      err,
      FormatError::InvalidPair(Box::new(FormatError::LatitudeDirection))
    );
    assert!(err.to_string().starts_with("invalid coordinate pair: "));

    let err = parse_coordinate_pair("34°3'7.92\"N", "34°3'7.92\"S").unwrap_err();
    assert_eq!(
      err,
      FormatError::InvalidPair(Box::new(FormatError::LongitudeDirection))
    );

    let err = parse_coordinate_pair("95°0'0\"N", "10°0'0\"E").unwrap_err();
    assert!(err.is_range_error());
  }

  #[test]
  fn test_free_text_dd() {
    let res = parse_free_text("34.0522°N, 118.2437°W");
    assert_eq!(res.detected_format(), Some(CoordinateFormat::DD));
    let point = res.to_point().unwrap();
    assert!((point.lat - 34.0522).abs() < 1e-6);
    assert!((point.lng + 118.2437).abs() < 1e-6);

    let point = parse_free_text("12.5S 45E").to_point().unwrap();
    assert_eq!(point.lat, -12.5);
    assert_eq!(point.lng, 45.0);
  }

  #[test]
  fn test_free_text_dms() {
    let res = parse_free_text("34°3'7.92\"N 118°14'37.32\"W");
    assert_eq!(res.detected_format(), Some(CoordinateFormat::DMS));
    let point = res.to_point().unwrap();
    assert!((point.lat - 34.0522).abs() < 1e-4);
    assert!((point.lng + 118.2437).abs() < 1e-4);
  }

  #[test]
  fn test_free_text_ddm() {
    let res = parse_free_text("fire at 34°3.132'n, 118°14.622'w");
    assert_eq!(res.detected_format(), Some(CoordinateFormat::DDM));
    let point = res.to_point().unwrap();
    assert!((point.lat - 34.0522).abs() < 1e-6);
    assert!((point.lng + 118.2437).abs() < 1e-6);
  }

  #[test]
  fn test_free_text_priority() {
    // whole minutes without seconds fit both the DMS and DDM patterns
    let text = "34°3'N 118°14'W";
    assert!(DMS_PAIR.is_match(text));
    assert!(DDM_PAIR.is_match(text));

    let res = parse_free_text(text);
    assert_eq!(res.detected_format(), Some(CoordinateFormat::DMS));
    match &res {
      FreeTextParse::Parsed { lat, lng, .. } => {
        assert_eq!((lat.degrees, lat.minutes, lat.seconds), (34, 3, 0.0));
        assert_eq!((lng.degrees, lng.minutes, lng.seconds), (118, 14, 0.0));
      }
      other => panic!("unexpected result {other:?}"),
    }
    let point = res.to_point().unwrap();
    assert!((point.lat - 34.05).abs() < 1e-9);
    assert!((point.lng + (118.0 + 14.0 / 60.0)).abs() < 1e-9);
  }

  #[test]
  fn test_free_text_failures() {
    assert_eq!(
      parse_free_text("   "),
      FreeTextParse::Failed {
        reason: "no input provided".into()
      }
    );
    let res = parse_free_text("somewhere near the ridge");
    assert!(!res.is_parsed());
    assert!(res.to_point().is_err());

    // parses, but is not a valid position
    let res = parse_free_text("95.0N 10.0E");
    assert!(res.is_parsed());
    assert!(res.to_point().unwrap_err().is_range_error());
  }
}
