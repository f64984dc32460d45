/// Hazard heuristics over raw METAR/TAF text. This is the only rule
/// set, every weather consumer goes through `classify`.
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt::Display;

pub const HIGH_WIND_KT: u32 = 18;
pub const LOW_VISIBILITY_M: u32 = 5000;

lazy_static! {
  static ref WIND_GROUP: Regex = Regex::new(r"\b(?:\d{3}|VRB)?(\d{2})(?:G\d{2,3})?KT\b").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WeatherHazard {
  HighWind,
  LowVisibility,
  Cumulonimbus,
}

impl Display for WeatherHazard {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      WeatherHazard::HighWind => "High winds",
      WeatherHazard::LowVisibility => "Low visibility",
      WeatherHazard::Cumulonimbus => "Cumulonimbus present",
    };
    write!(f, "{s}")
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WeatherVerdict {
  pub is_hazardous: bool,
  pub reasons: Vec<WeatherHazard>,
}

impl WeatherVerdict {
  fn from_reasons(mut reasons: Vec<WeatherHazard>) -> Self {
    reasons.sort();
    reasons.dedup();
    Self {
      is_hazardous: !reasons.is_empty(),
      reasons,
    }
  }

  /// Union of several reports (e.g. METAR and TAF) in tag order
  pub fn combine<'a>(reports: impl IntoIterator<Item = &'a str>) -> Self {
    let reasons = reports
      .into_iter()
      .flat_map(|r| classify(r).reasons)
      .collect();
    Self::from_reasons(reasons)
  }
}

fn has_high_wind(report: &str) -> bool {
  WIND_GROUP.captures_iter(report).any(|caps| {
    caps
      .get(1)
      .and_then(|m| m.as_str().parse::<u32>().ok())
      .map(|speed| speed > HIGH_WIND_KT)
      .unwrap_or(false)
  })
}

fn has_low_visibility(report: &str) -> bool {
  report
    .split_whitespace()
    .filter(|tok| tok.len() == 4 && tok.bytes().all(|b| b.is_ascii_digit()))
    .filter_map(|tok| tok.parse::<u32>().ok())
    .any(|meters| meters < LOW_VISIBILITY_M)
}

pub fn classify(report: &str) -> WeatherVerdict {
  let mut reasons = vec![];
  if has_high_wind(report) {
    reasons.push(WeatherHazard::HighWind);
  }
  if has_low_visibility(report) {
    reasons.push(WeatherHazard::LowVisibility);
  }
  if report.contains("CB") {
    reasons.push(WeatherHazard::Cumulonimbus);
  }
  WeatherVerdict::from_reasons(reasons)
}
