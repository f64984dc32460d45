use super::types::{AirportRecord, AirportType, NearbyAirport};
use crate::{geo::distance, types::GeoPoint};

pub const DEFAULT_RADIUS_NM: f64 = 300.0;

/// In-memory airport table, immutable once loaded
#[derive(Debug, Default)]
pub struct AirportDirectory {
  airports: Vec<AirportRecord>,
  loaded: bool,
}

impl AirportDirectory {
  pub fn empty() -> Self {
    Default::default()
  }

  pub fn from_records(airports: Vec<AirportRecord>) -> Self {
    Self {
      airports,
      loaded: true,
    }
  }

  pub fn is_loaded(&self) -> bool {
    self.loaded
  }

  pub fn len(&self) -> usize {
    self.airports.len()
  }

  pub fn is_empty(&self) -> bool {
    self.airports.is_empty()
  }

  pub fn airports(&self) -> &[AirportRecord] {
    &self.airports
  }

  pub fn find_airport(&self, code: &str) -> Option<&AirportRecord> {
    let code = code.trim();
    if code.is_empty() {
      return None;
    }
    self.airports.iter().find(|a| a.has_code(code))
  }

  pub fn search_by_code(&self, code: &str) -> Vec<&AirportRecord> {
    let code = code.trim();
    if code.is_empty() {
      return vec![];
    }
    self.airports.iter().filter(|a| a.has_code(code)).collect()
  }

  pub fn search_by_name(&self, query: &str) -> Vec<&AirportRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
      return vec![];
    }
    self
      .airports
      .iter()
      .filter(|a| {
        a.name.to_lowercase().contains(&query)
          || a.municipality.to_lowercase().contains(&query)
          || a.keywords.to_lowercase().contains(&query)
      })
      .collect()
  }

  /// Code matches first, then name matches, without repeats.
  /// Queries shorter than two characters return nothing.
  pub fn search(&self, query: &str, limit: usize) -> Vec<&AirportRecord> {
    let query = query.trim();
    if query.chars().count() < 2 {
      return vec![];
    }
    let mut hits = self.search_by_code(query);
    for airport in self.search_by_name(query) {
      if !hits.iter().any(|h| std::ptr::eq(*h, airport)) {
        hits.push(airport);
      }
    }
    hits.truncate(limit);
    hits
  }

  /// Airports of the allowed types within `radius_nm`, nearest first.
  /// Equal distances keep table order.
  pub fn find_nearby(
    &self,
    point: &GeoPoint,
    radius_nm: f64,
    allowed_types: &[AirportType],
  ) -> Vec<NearbyAirport> {
    let mut nearby: Vec<NearbyAirport> = self
      .airports
      .iter()
      .filter(|a| allowed_types.contains(&a.airport_type))
      .map(|a| NearbyAirport {
        distance_nm: distance(point, &a.position),
        airport: a.clone(),
      })
      .filter(|n| n.distance_nm <= radius_nm)
      .collect();
    // sort_by is stable
    nearby.sort_by(|a, b| a.distance_nm.total_cmp(&b.distance_nm));
    nearby
  }
}
