use crate::{
  config::Config,
  coords::{
    check_precision, entry::ManualEntry, error::FormatError, parser::parse_free_text,
    CoordinateFormat, DisplaySettings,
  },
  fixed::{self, data::AirportDirectory, types::NearbyAirport},
  geo::NavSolution,
  persistent::{KeyValueStore, StoreError},
  types::{GeoPoint, LocationRole},
  weather::{
    client::{AutorouterClient, Credentials},
    AirportAssessment, WeatherManager,
  },
};
use chrono::Duration;
use log::{info, warn};
use std::{io, sync::Arc};
use thiserror::Error;
use tokio::task;

#[derive(Debug, Error)]
pub enum UpdateError {
  #[error(transparent)]
  Format(#[from] FormatError),
  #[error(transparent)]
  Store(#[from] StoreError),
}

/// How a new fire/base position was provided
#[derive(Debug, Clone)]
pub enum LocationInput {
  Point(GeoPoint),
  Text(String),
  Entry(ManualEntry),
}

/// Application context. Every component is built once here and handed
/// out by reference, nothing is looked up globally.
#[derive(Debug)]
pub struct Manager {
  cfg: Config,
  airports: Arc<AirportDirectory>,
  weather: Arc<WeatherManager>,
  store: Arc<KeyValueStore>,
}

impl Manager {
  pub async fn new(cfg: Config) -> Self {
    info!("setting fire map manager up");
    let store = KeyValueStore::open_or_empty(&cfg.storage.path);
    let airports = fixed::load_or_empty(&cfg).await;
    Self::with_parts(cfg, airports, store)
  }

  pub fn with_parts(cfg: Config, airports: AirportDirectory, store: KeyValueStore) -> Self {
    let client = AutorouterClient::new(
      &cfg.autorouter.base_url,
      cfg.autorouter.token_leeway_sec,
      store.credentials(),
    );
    let weather = WeatherManager::new(
      Arc::new(client),
      Duration::seconds(cfg.weather.cache_ttl_sec),
    );
    Self {
      cfg,
      airports: Arc::new(airports),
      weather: Arc::new(weather),
      store: Arc::new(store),
    }
  }

  pub fn config(&self) -> &Config {
    &self.cfg
  }

  pub fn airports(&self) -> &AirportDirectory {
    &self.airports
  }

  pub fn weather(&self) -> &Arc<WeatherManager> {
    &self.weather
  }

  pub fn display_settings(&self) -> DisplaySettings {
    self.store.display_settings(self.cfg.display.settings())
  }

  /// Nothing is written when the precision is out of range
  pub fn set_display(
    &self,
    format: Option<CoordinateFormat>,
    precision: Option<usize>,
  ) -> Result<DisplaySettings, UpdateError> {
    let precision = precision.map(check_precision).transpose()?;
    if let Some(format) = format {
      self.store.save_format(format)?;
    }
    if let Some(precision) = precision {
      self.store.save_precision(precision)?;
    }
    Ok(self.display_settings())
  }

  pub fn format_point(&self, point: &GeoPoint) -> String {
    self.display_settings().format_point(point)
  }

  pub fn location(&self, role: LocationRole) -> Option<GeoPoint> {
    self.store.location(role)
  }

  /// Resolves the input to a point and stores it for the role.
  /// Nothing is written if the input doesn't validate.
  pub fn set_location(&self, role: LocationRole, input: LocationInput) -> Result<GeoPoint, UpdateError> {
    let point = match input {
      LocationInput::Point(p) => GeoPoint::new(p.lat, p.lng)?,
      LocationInput::Text(text) => parse_free_text(&text).to_point()?,
      LocationInput::Entry(entry) => entry.validate()?,
    };
    self.store.save_location(role, &point)?;
    info!("{role} location set to {}", self.format_point(&point));
    Ok(point)
  }

  /// Base to fire navigation, once both points are known
  pub fn nav_solution(&self) -> Option<NavSolution> {
    let base = self.location(LocationRole::Base)?;
    let fire = self.location(LocationRole::Fire)?;
    Some(NavSolution::between(
      &base,
      &fire,
      self.cfg.flight.cruise_speed_kt,
    ))
  }

  pub fn find_nearby(&self, point: &GeoPoint, radius_nm: Option<f64>) -> Vec<NearbyAirport> {
    let radius = radius_nm.unwrap_or(self.cfg.airports.radius_nm);
    self
      .airports
      .find_nearby(point, radius, &self.cfg.airports.types)
  }

  /// Nearby airports around the fire with their weather risk
  pub async fn assess_fire_area(&self) -> Option<Vec<AirportAssessment>> {
    let fire = self.location(LocationRole::Fire)?;
    let nearby = self.find_nearby(&fire, None);
    info!("assessing weather at {} airports near the fire", nearby.len());
    Some(self.weather.assess_all(nearby).await)
  }

  /// Runs a store write on the blocking pool
  async fn write_store<F>(&self, write: F) -> Result<(), StoreError>
  where
    F: FnOnce(&KeyValueStore) -> Result<(), StoreError> + Send + 'static,
  {
    let store = self.store.clone();
    task::spawn_blocking(move || write(&store))
      .await
      .map_err(|err| StoreError::Io(io::Error::new(io::ErrorKind::Other, err)))?
  }

  pub async fn set_credentials(&self, credentials: Credentials) -> Result<(), StoreError> {
    let saved = credentials.clone();
    self
      .write_store(move |store| store.save_credentials(&saved))
      .await?;
    self.weather.client().set_credentials(Some(credentials)).await;
    self.weather.clear_cache().await;
    Ok(())
  }

  pub async fn clear_credentials(&self) -> Result<(), StoreError> {
    self.weather.client().set_credentials(None).await;
    self.weather.clear_cache().await;
    if let Err(err) = self.write_store(|store| store.clear_credentials()).await {
      warn!("error clearing stored credentials: {err}");
      return Err(err);
    }
    Ok(())
  }
}
