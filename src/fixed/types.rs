use crate::types::GeoPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AirportType {
  LargeAirport,
  MediumAirport,
  SmallAirport,
  Heliport,
  SeaplaneBase,
  BalloonPort,
  Closed,
  Other(String),
}

impl AirportType {
  pub fn as_str(&self) -> &str {
    match self {
      AirportType::LargeAirport => "large_airport",
      AirportType::MediumAirport => "medium_airport",
      AirportType::SmallAirport => "small_airport",
      AirportType::Heliport => "heliport",
      AirportType::SeaplaneBase => "seaplane_base",
      AirportType::BalloonPort => "balloonport",
      AirportType::Closed => "closed",
      AirportType::Other(s) => s.as_str(),
    }
  }

  /// Types considered for fire-response proximity searches by default
  pub fn default_nearby() -> Vec<AirportType> {
    vec![
      AirportType::LargeAirport,
      AirportType::MediumAirport,
      AirportType::SmallAirport,
    ]
  }
}

impl From<&str> for AirportType {
  fn from(s: &str) -> Self {
    match s {
      "large_airport" => AirportType::LargeAirport,
      "medium_airport" => AirportType::MediumAirport,
      "small_airport" => AirportType::SmallAirport,
      "heliport" => AirportType::Heliport,
      "seaplane_base" => AirportType::SeaplaneBase,
      "balloonport" => AirportType::BalloonPort,
      "closed" => AirportType::Closed,
      other => AirportType::Other(other.to_owned()),
    }
  }
}

impl From<String> for AirportType {
  fn from(s: String) -> Self {
    s.as_str().into()
  }
}

impl From<AirportType> for String {
  fn from(t: AirportType) -> Self {
    t.as_str().to_owned()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportRecord {
  pub id: String,
  pub ident: String,
  pub airport_type: AirportType,
  pub name: String,
  pub position: GeoPoint,
  pub elevation_ft: Option<i32>,
  pub continent: String,
  pub iso_country: String,
  pub iso_region: String,
  pub municipality: String,
  pub scheduled_service: bool,
  pub icao_code: String,
  pub iata_code: String,
  pub gps_code: String,
  pub local_code: String,
  pub home_link: String,
  pub wikipedia_link: String,
  pub keywords: String,
}

impl AirportRecord {
  /// Best code to show a user, ICAO first
  pub fn display_code(&self) -> &str {
    [&self.icao_code, &self.iata_code, &self.local_code, &self.ident]
      .into_iter()
      .find(|c| !c.is_empty())
      .map(|c| c.as_str())
      .unwrap_or("")
  }

  pub fn has_code(&self, code: &str) -> bool {
    [
      &self.icao_code,
      &self.iata_code,
      &self.gps_code,
      &self.local_code,
      &self.ident,
    ]
    .into_iter()
    .any(|c| !c.is_empty() && c.eq_ignore_ascii_case(code))
  }

  pub fn info(&self) -> AirportInfo {
    AirportInfo {
      name: self.name.clone(),
      airport_type: self.airport_type.clone(),
      location: AirportLocation {
        lat: self.position.lat,
        lng: self.position.lng,
        elevation_ft: self.elevation_ft,
        municipality: self.municipality.clone(),
        country: self.iso_country.clone(),
        region: self.iso_region.clone(),
        continent: self.continent.clone(),
      },
      codes: AirportCodes {
        icao: self.icao_code.clone(),
        iata: self.iata_code.clone(),
        gps: self.gps_code.clone(),
        local: self.local_code.clone(),
      },
      services: AirportServices {
        scheduled: self.scheduled_service,
      },
      links: AirportLinks {
        home: self.home_link.clone(),
        wikipedia: self.wikipedia_link.clone(),
      },
      keywords: self.keywords.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportInfo {
  pub name: String,
  #[serde(rename = "type")]
  pub airport_type: AirportType,
  pub location: AirportLocation,
  pub codes: AirportCodes,
  pub services: AirportServices,
  pub links: AirportLinks,
  pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportLocation {
  pub lat: f64,
  pub lng: f64,
  pub elevation_ft: Option<i32>,
  pub municipality: String,
  pub country: String,
  pub region: String,
  pub continent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportCodes {
  pub icao: String,
  pub iata: String,
  pub gps: String,
  pub local: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportServices {
  pub scheduled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportLinks {
  pub home: String,
  pub wikipedia: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyAirport {
  pub airport: AirportRecord,
  pub distance_nm: f64,
}
