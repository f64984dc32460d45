use crate::{
  coords::{CoordinateFormat, DisplaySettings, DEFAULT_PRECISION},
  fixed::{data::DEFAULT_RADIUS_NM, types::AirportType},
  geo::DEFAULT_CRUISE_SPEED_KT,
};
use log::LevelFilter;
use serde::Deserialize;
use std::{env, fs, path::Path};

const DEFAULT_CONFIG_PATH: &str = "firemap.toml";
const CONFIG_ENV: &str = "FIREMAP_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  pub level: LevelFilter,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: LevelFilter::Info,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirportsConfig {
  pub source: String,
  pub radius_nm: f64,
  pub types: Vec<AirportType>,
}

impl Default for AirportsConfig {
  fn default() -> Self {
    Self {
      source: "data/airports.csv".into(),
      radius_nm: DEFAULT_RADIUS_NM,
      types: AirportType::default_nearby(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
  pub cruise_speed_kt: f64,
}

impl Default for FlightConfig {
  fn default() -> Self {
    Self {
      cruise_speed_kt: DEFAULT_CRUISE_SPEED_KT,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
  pub format: CoordinateFormat,
  pub precision: usize,
}

impl Default for DisplayConfig {
  fn default() -> Self {
    Self {
      format: CoordinateFormat::DD,
      precision: DEFAULT_PRECISION,
    }
  }
}

impl DisplayConfig {
  pub fn settings(&self) -> DisplaySettings {
    DisplaySettings {
      format: self.format,
      precision: self.precision,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AutorouterConfig {
  pub base_url: String,
  pub token_leeway_sec: i64,
}

impl Default for AutorouterConfig {
  fn default() -> Self {
    Self {
      base_url: "https://api.autorouter.aero/v1.0".into(),
      token_leeway_sec: 30,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
  pub cache_ttl_sec: i64,
}

impl Default for WeatherConfig {
  fn default() -> Self {
    Self { cache_ttl_sec: 600 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
  pub path: String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      path: "firemap-storage.json".into(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub log: LogConfig,
  pub airports: AirportsConfig,
  pub flight: FlightConfig,
  pub display: DisplayConfig,
  pub autorouter: AutorouterConfig,
  pub weather: WeatherConfig,
  pub storage: StorageConfig,
}

/// Reads the TOML config. A missing or broken file falls back to defaults
/// since the logger isn't set up yet, problems go to stderr.
pub fn read_config(path: Option<&str>) -> Config {
  let path = path
    .map(|p| p.to_owned())
    .or_else(|| env::var(CONFIG_ENV).ok())
    .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_owned());

  if !Path::new(&path).exists() {
    return Config::default();
  }

  let raw = match fs::read_to_string(&path) {
    Ok(raw) => raw,
    Err(err) => {
      eprintln!("error reading config {path}: {err}, using defaults");
      return Config::default();
    }
  };

  match parse_config(&raw) {
    Ok(cfg) => cfg,
    Err(err) => {
      eprintln!("error parsing config {path}: {err}, using defaults");
      Config::default()
    }
  }
}

pub fn parse_config(raw: &str) -> Result<Config, toml::de::Error> {
  toml::from_str(raw)
}
