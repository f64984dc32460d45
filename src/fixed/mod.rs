/// Fixed data provider
/// The airport table follows the ourairports.com `airports.csv` layout.
/// It is read once at startup and never modified afterwards.
pub mod data;
pub mod parser;
pub mod types;

use self::data::AirportDirectory;
use crate::{config::Config, seconds_since};
use chrono::Utc;
use log::{error, info};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
  #[error("error reading airport table: {0}")]
  Io(#[from] std::io::Error),
  #[error("error fetching airport table: {0}")]
  Http(#[from] reqwest::Error),
  #[error("airport table request failed with status {0}")]
  Status(u16),
  #[error("error parsing airport table: {0}")]
  Csv(#[from] csv::Error),
  #[error("airport table has no {0} column")]
  MissingColumn(String),
}

async fn read_source(source: &str) -> Result<String, LoadError> {
  if source.starts_with("http://") || source.starts_with("https://") {
    let resp = reqwest::get(source).await?;
    if !resp.status().is_success() {
      return Err(LoadError::Status(resp.status().as_u16()));
    }
    Ok(resp.text().await?)
  } else {
    Ok(tokio::fs::read_to_string(source).await?)
  }
}

pub async fn load_airports(cfg: &Config) -> Result<AirportDirectory, LoadError> {
  let source = &cfg.airports.source;
  info!("loading airports from {source}");

  let t = Utc::now();
  let raw = read_source(source).await?;
  let airports = parser::parse_table(&raw)?;
  info!(
    "{} airports parsed in {}s",
    airports.len(),
    seconds_since(t)
  );
  Ok(AirportDirectory::from_records(airports))
}

/// Never fails: an unreadable table leaves the directory empty
pub async fn load_or_empty(cfg: &Config) -> AirportDirectory {
  match load_airports(cfg).await {
    Ok(dir) => dir,
    Err(err) => {
      error!("airport data unavailable: {err}");
      AirportDirectory::empty()
    }
  }
}

#[cfg(test)]
pub mod tests {
  use super::*;
  use std::io::Write;

  #[tokio::test]
  async fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(parser::tests::SAMPLE.as_bytes()).unwrap();

    let mut cfg: Config = Default::default();
    cfg.airports.source = file.path().to_string_lossy().into_owned();
    let dir = load_airports(&cfg).await.unwrap();
    assert!(dir.is_loaded());
    assert_eq!(dir.len(), 4);
  }

  #[tokio::test]
  async fn test_missing_source_degrades() {
    let mut cfg: Config = Default::default();
    cfg.airports.source = "/nonexistent/airports.csv".into();
    assert!(matches!(load_airports(&cfg).await, Err(LoadError::Io(_))));

    let dir = load_or_empty(&cfg).await;
    assert!(!dir.is_loaded());
    assert!(dir.is_empty());
  }
}
