use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
  pub access_token: String,
  pub expires_in: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
  pub error: Option<String>,
  pub error_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetarTaf {
  #[serde(default)]
  pub metar: Option<String>,
  #[serde(default)]
  pub taf: Option<String>,
}

impl MetarTaf {
  pub fn is_empty(&self) -> bool {
    self.metar.is_none() && self.taf.is_none()
  }

  pub fn reports(&self) -> impl Iterator<Item = &str> {
    self.metar.iter().chain(self.taf.iter()).map(|s| s.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notam {
  pub id: Option<i64>,
  pub series: Option<String>,
  pub number: Option<i64>,
  pub year: Option<i64>,
  pub itema: Option<Vec<String>>,
  pub iteme: Option<String>,
  pub startvalidity: Option<i64>,
  pub endvalidity: Option<i64>,
  #[serde(flatten)]
  pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotamPage {
  pub total: u64,
  #[serde(default)]
  pub rows: Vec<Notam>,
}
