pub mod client;
pub mod ext_types;
pub mod rules;
#[cfg(test)]
pub mod stub;

use self::{
  client::{AutorouterClient, ClientError},
  ext_types::MetarTaf,
  rules::WeatherVerdict,
};
use crate::fixed::types::NearbyAirport;
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use serde::Serialize;
use std::{
  collections::HashMap,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
};
use tokio::{sync::RwLock, task::JoinSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherInfo {
  pub metar: Option<String>,
  pub taf: Option<String>,
  pub verdict: WeatherVerdict,
  pub ts: DateTime<Utc>,
}

impl From<MetarTaf> for WeatherInfo {
  fn from(value: MetarTaf) -> Self {
    Self {
      verdict: WeatherVerdict::combine(value.reports()),
      metar: value.metar,
      taf: value.taf,
      ts: Utc::now(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WeatherStatus {
  Unavailable { reason: String },
  Failed { reason: String },
  Assessed { verdict: WeatherVerdict },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
  Gray,
  Red,
  Green,
}

impl MarkerColor {
  pub fn hex(&self) -> &'static str {
    match self {
      MarkerColor::Gray => "#757575",
      MarkerColor::Red => "#f44336",
      MarkerColor::Green => "#4CAF50",
    }
  }
}

impl WeatherStatus {
  pub fn marker_color(&self) -> MarkerColor {
    match self {
      WeatherStatus::Assessed { verdict } if verdict.is_hazardous => MarkerColor::Red,
      WeatherStatus::Assessed { .. } => MarkerColor::Green,
      _ => MarkerColor::Gray,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportAssessment {
  #[serde(flatten)]
  pub nearby: NearbyAirport,
  pub weather: WeatherStatus,
  pub marker: MarkerColor,
}

/// Cached METAR/TAF access on top of the remote client
#[derive(Debug)]
pub struct WeatherManager {
  client: Arc<AutorouterClient>,
  ttl: Duration,
  cache: RwLock<HashMap<String, WeatherInfo>>,
  apireq_num: AtomicUsize,
}

impl WeatherManager {
  pub fn new(client: Arc<AutorouterClient>, ttl: Duration) -> Self {
    Self {
      client,
      ttl,
      cache: Default::default(),
      apireq_num: AtomicUsize::new(0),
    }
  }

  pub fn client(&self) -> &AutorouterClient {
    &self.client
  }

  pub fn request_num(&self) -> usize {
    self.apireq_num.load(Ordering::Relaxed)
  }

  async fn get_cache(&self, icao: &str) -> Option<WeatherInfo> {
    let cache = self.cache.read().await;
    let value = cache.get(icao)?;
    if Utc::now() - value.ts > self.ttl {
      None
    } else {
      debug!("weather for {icao} served from cache");
      Some(value.clone())
    }
  }

  pub async fn get(&self, icao: &str) -> Result<WeatherInfo, ClientError> {
    let icao = icao.trim().to_uppercase();
    if let Some(wx) = self.get_cache(&icao).await {
      return Ok(wx);
    }

    info!("collecting weather for {icao} from remote api");
    self.apireq_num.fetch_add(1, Ordering::Relaxed);
    let wx: WeatherInfo = self.client.get_weather(&icao).await?.into();
    self.cache.write().await.insert(icao, wx.clone());
    Ok(wx)
  }

  pub async fn clear_cache(&self) {
    self.cache.write().await.clear();
  }

  pub async fn status_for(&self, icao: &str) -> WeatherStatus {
    if icao.is_empty() {
      return WeatherStatus::Unavailable {
        reason: "airport has no ICAO code".into(),
      };
    }
    if !self.client.has_credentials().await {
      return WeatherStatus::Unavailable {
        reason: "weather data unavailable, configure autorouter API credentials".into(),
      };
    }
    match self.get(icao).await {
      Ok(wx) if wx.metar.is_none() && wx.taf.is_none() => WeatherStatus::Unavailable {
        reason: format!("no weather reported for {icao}"),
      },
      Ok(wx) => WeatherStatus::Assessed {
        verdict: wx.verdict,
      },
      Err(err) if err.is_auth() => {
        error!("weather for {icao} unavailable: {err}");
        WeatherStatus::Unavailable {
          reason: err.to_string(),
        }
      }
      Err(err) => {
        error!("failed to get weather for {icao}: {err}");
        WeatherStatus::Failed {
          reason: err.to_string(),
        }
      }
    }
  }

  /// Fetches weather for every airport concurrently. A failure for one
  /// airport never affects the others. Output keeps the input order.
  pub async fn assess_all(self: &Arc<Self>, airports: Vec<NearbyAirport>) -> Vec<AirportAssessment> {
    let mut statuses: Vec<Option<WeatherStatus>> = vec![None; airports.len()];
    let mut tasks = JoinSet::new();

    for (idx, nearby) in airports.iter().enumerate() {
      let manager = self.clone();
      let icao = nearby.airport.icao_code.clone();
      tasks.spawn(async move { (idx, manager.status_for(&icao).await) });
    }

    while let Some(res) = tasks.join_next().await {
      match res {
        Ok((idx, status)) => statuses[idx] = Some(status),
        Err(err) => error!("weather task failed: {err}"),
      }
    }

    airports
      .into_iter()
      .zip(statuses)
      .map(|(nearby, status)| {
        let weather = status.unwrap_or_else(|| WeatherStatus::Failed {
          reason: "weather task aborted".into(),
        });
        AirportAssessment {
          marker: weather.marker_color(),
          nearby,
          weather,
        }
      })
      .collect()
  }
}
