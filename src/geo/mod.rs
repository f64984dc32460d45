/// Spherical-earth navigation between two points.
/// Track values are true track, no magnetic variation is applied.
use crate::types::GeoPoint;
use serde::Serialize;
use std::fmt::Display;

pub const EARTH_RADIUS_NM: f64 = 3440.065;
pub const DEFAULT_CRUISE_SPEED_KT: f64 = 150.0;

/// Great-circle (haversine) distance in nautical miles
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
  let phi1 = a.lat.to_radians();
  let phi2 = b.lat.to_radians();
  let dphi = (b.lat - a.lat).to_radians();
  let dlambda = (b.lng - a.lng).to_radians();

  let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
  let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
  EARTH_RADIUS_NM * c
}

/// Initial true bearing from a to b, in [0, 360)
pub fn initial_bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
  let phi1 = a.lat.to_radians();
  let phi2 = b.lat.to_radians();
  let dlambda = (b.lng - a.lng).to_radians();

  let y = dlambda.sin() * phi2.cos();
  let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
  let track = y.atan2(x).to_degrees();
  let track = (track + 360.0) % 360.0;
  // -0.0 and values rounding up to exactly 360.0
  if track >= 360.0 || track == 0.0 {
    0.0
  } else {
    track
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlightTime {
  pub hours: u32,
  pub minutes: u32,
}

impl FlightTime {
  pub fn total_minutes(&self) -> u32 {
    self.hours * 60 + self.minutes
  }
}

impl Display for FlightTime {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}:{:02}", self.hours, self.minutes)
  }
}

/// Linear flight time estimate. Returns None for a non-positive speed.
pub fn flight_time(distance_nm: f64, speed_kt: f64) -> Option<FlightTime> {
  if !(speed_kt > 0.0) || !distance_nm.is_finite() {
    return None;
  }
  let hours = distance_nm.max(0.0) / speed_kt;
  // round the whole duration so 59.6 minutes carries into the next hour
  let total = (hours * 60.0).round() as u32;
  Some(FlightTime {
    hours: total / 60,
    minutes: total % 60,
  })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavSolution {
  pub distance_nm: f64,
  pub true_track: f64,
  pub flight_time: Option<FlightTime>,
}

impl NavSolution {
  pub fn between(from: &GeoPoint, to: &GeoPoint, speed_kt: f64) -> Self {
    let distance_nm = distance(from, to);
    Self {
      distance_nm,
      true_track: initial_bearing(from, to),
      flight_time: flight_time(distance_nm, speed_kt),
    }
  }

  pub fn summary(&self) -> String {
    let time = self
      .flight_time
      .map(|t| t.to_string())
      .unwrap_or_else(|| "--".to_owned());
    format!(
      "{:.1}nm, {:03}°T, {}",
      self.distance_nm,
      self.true_track.round() as u32 % 360,
      time
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn p(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint { lat, lng }
  }

  #[test]
  fn test_distance_basics() {
    let la = p(34.0522, -118.2437);
    let sf = p(37.6213, -122.3790);
    let den = p(39.8561, -104.6737);

    assert_eq!(distance(&la, &la), 0.0);
    assert!((distance(&la, &sf) - distance(&sf, &la)).abs() < 1e-9);
    // LAX area to SFO is a bit over 290nm
    let d = distance(&la, &sf);
    assert!(d > 280.0 && d < 300.0, "unexpected distance {d}");

    assert!(distance(&la, &den) <= distance(&la, &sf) + distance(&sf, &den) + 1e-9);
    assert!(distance(&sf, &den) <= distance(&sf, &la) + distance(&la, &den) + 1e-9);
  }

  #[test]
  fn test_one_degree_of_latitude() {
    let d = distance(&p(0.0, 0.0), &p(1.0, 0.0));
    assert!((d - 60.04).abs() < 0.01, "unexpected distance {d}");
  }

  #[test]
  fn test_bearing() {
    let origin = p(0.0, 0.0);
    assert!((initial_bearing(&origin, &p(1.0, 0.0)) - 0.0).abs() < 1e-9);
    assert!((initial_bearing(&origin, &p(0.0, 1.0)) - 90.0).abs() < 1e-9);
    assert!((initial_bearing(&origin, &p(-1.0, 0.0)) - 180.0).abs() < 1e-9);
    assert!((initial_bearing(&origin, &p(0.0, -1.0)) - 270.0).abs() < 1e-9);

    let a = p(34.0, -118.0);
    let b = p(37.0, -122.0);
    let fwd = initial_bearing(&a, &b);
    let back = initial_bearing(&b, &a);
    assert!(fwd >= 0.0 && fwd < 360.0);
    assert!((fwd - back).abs() > 1.0);
  }

  #[test]
  fn test_flight_time() {
    assert_eq!(flight_time(150.0, 150.0).unwrap().to_string(), "1:00");
    assert_eq!(flight_time(75.0, 150.0).unwrap().to_string(), "0:30");
    assert_eq!(flight_time(0.0, 150.0).unwrap().to_string(), "0:00");
    assert_eq!(flight_time(312.5, 150.0).unwrap().to_string(), "2:05");
    // 1h59.8m rounds into the next hour instead of printing 1:60
    assert_eq!(flight_time(299.5, 150.0).unwrap().to_string(), "2:00");
    assert!(flight_time(10.0, 0.0).is_none());
  }

  #[test]
  fn test_nav_solution() {
    let base = p(0.0, 0.0);
    let fire = p(0.0, 1.0);
    let nav = NavSolution::between(&base, &fire, DEFAULT_CRUISE_SPEED_KT);
    assert!((nav.true_track - 90.0).abs() < 1e-9);
    assert_eq!(nav.summary(), "60.0nm, 090°T, 0:24");
  }
}
