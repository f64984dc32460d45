use crate::{
  coords::{entry::ManualEntry, CoordinateFormat, DisplaySettings},
  fixed::types::{AirportInfo, AirportRecord},
  geo::NavSolution,
  manager::LocationInput,
  types::{GeoPoint, LocationRole},
};
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

impl<'a> FromParam<'a> for LocationRole {
  type Error = String;

  fn from_param(param: &'a str) -> Result<Self, Self::Error> {
    param.parse()
  }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LocationUpdate {
  Point(GeoPoint),
  Entry(ManualEntry),
  Text { text: String },
}

impl From<LocationUpdate> for LocationInput {
  fn from(update: LocationUpdate) -> Self {
    match update {
      LocationUpdate::Point(p) => LocationInput::Point(p),
      LocationUpdate::Entry(e) => LocationInput::Entry(e),
      LocationUpdate::Text { text } => LocationInput::Text(text),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct PlacedPoint {
  #[serde(flatten)]
  pub point: GeoPoint,
  pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct NavView {
  #[serde(flatten)]
  pub solution: NavSolution,
  pub flight_time_text: Option<String>,
  /// no magnetic variation is applied
  pub track_reference: &'static str,
}

impl From<NavSolution> for NavView {
  fn from(solution: NavSolution) -> Self {
    Self {
      flight_time_text: solution.flight_time.map(|t| t.to_string()),
      solution,
      track_reference: "true",
    }
  }
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
  pub fire: Option<PlacedPoint>,
  pub base: Option<PlacedPoint>,
  pub nav: Option<NavView>,
}

#[derive(Debug, Deserialize)]
pub struct PreferencesUpdate {
  pub format: Option<CoordinateFormat>,
  pub precision: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FormattedPoint {
  pub text: String,
  #[serde(flatten)]
  pub settings: DisplaySettings,
}

#[derive(Debug, Serialize)]
pub struct AirportSearchHit {
  pub code: String,
  pub coordinates: String,
  #[serde(flatten)]
  pub info: AirportInfo,
}

impl AirportSearchHit {
  pub fn new(airport: &AirportRecord, settings: &DisplaySettings) -> Self {
    Self {
      code: airport.display_code().to_owned(),
      coordinates: settings.format_point(&airport.position),
      info: airport.info(),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
  pub status: &'static str,
}
