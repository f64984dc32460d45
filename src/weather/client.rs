use super::ext_types::{ErrorResponse, MetarTaf, NotamPage, TokenResponse};
use chrono::{DateTime, Duration, Utc};
use log::{debug, error, info};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::{
  atomic::{AtomicU64, Ordering},
  Arc,
};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone, Error)]
pub enum ClientError {
  #[error("authentication required, no API credentials configured")]
  MissingCredentials,
  #[error("authentication failed: {0}")]
  AuthRejected(String),
  #[error("request failed: {0}")]
  Network(Arc<reqwest::Error>),
  #[error("API call failed ({status}): {description}")]
  Fetch { status: u16, description: String },
}

impl From<reqwest::Error> for ClientError {
  fn from(err: reqwest::Error) -> Self {
    ClientError::Network(Arc::new(err))
  }
}

impl ClientError {
  /// Auth problems make weather unavailable rather than failed
  pub fn is_auth(&self) -> bool {
    matches!(
      self,
      ClientError::MissingCredentials | ClientError::AuthRejected(_)
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
  pub email: String,
  pub api_key: String,
}

#[derive(Debug, Clone)]
struct AccessToken {
  value: String,
  expires_at: DateTime<Utc>,
}

impl AccessToken {
  fn is_valid(&self) -> bool {
    Utc::now() < self.expires_at
  }
}

#[derive(Debug, Default)]
struct TokenState {
  token: Option<AccessToken>,
  // outcome of the last refresh when it failed
  failure: Option<ClientError>,
}

/// OAuth2 client-credentials client for the autorouter aviation API
#[derive(Debug)]
pub struct AutorouterClient {
  http: Client,
  base_url: String,
  token_leeway: Duration,
  credentials: RwLock<Option<Credentials>>,
  // held for the whole refresh so concurrent callers share one attempt
  token: Mutex<TokenState>,
  refreshes: AtomicU64,
}

impl AutorouterClient {
  pub fn new(base_url: &str, token_leeway_sec: i64, credentials: Option<Credentials>) -> Self {
    Self {
      http: Client::new(),
      base_url: base_url.trim_end_matches('/').to_owned(),
      token_leeway: Duration::seconds(token_leeway_sec.max(0)),
      credentials: RwLock::new(credentials),
      token: Mutex::new(TokenState::default()),
      refreshes: AtomicU64::new(0),
    }
  }

  pub async fn set_credentials(&self, credentials: Option<Credentials>) {
    *self.credentials.write().await = credentials;
    *self.token.lock().await = TokenState::default();
  }

  pub async fn has_credentials(&self) -> bool {
    self.credentials.read().await.is_some()
  }

  pub async fn is_authenticated(&self) -> bool {
    self
      .token
      .lock()
      .await
      .token
      .as_ref()
      .map(|t| t.is_valid())
      .unwrap_or(false)
  }

  async fn authenticate(&self) -> Result<AccessToken, ClientError> {
    let credentials = self
      .credentials
      .read()
      .await
      .clone()
      .ok_or(ClientError::MissingCredentials)?;

    info!("requesting autorouter access token for {}", credentials.email);
    let resp = self
      .http
      .post(format!("{}/oauth2/token", self.base_url))
      .form(&[
        ("grant_type", "client_credentials"),
        ("client_id", credentials.email.as_str()),
        ("client_secret", credentials.api_key.as_str()),
      ])
      .send()
      .await?;

    if !resp.status().is_success() {
      let (_, description) = describe_failure(resp).await;
      error!("autorouter authentication failed: {description}");
      return Err(ClientError::AuthRejected(description));
    }

    let token = resp.json::<TokenResponse>().await?;
    let expires_at = Utc::now() + Duration::seconds(token.expires_in) - self.token_leeway;
    Ok(AccessToken {
      value: token.access_token,
      expires_at,
    })
  }

  /// Returns a valid bearer token, refreshing it when needed.
  /// `rejected` is a token the server just refused; it's only replaced
  /// if nobody else refreshed it in the meantime. Callers that queued
  /// behind a failed refresh get its error instead of trying again.
  async fn bearer(&self, rejected: Option<&str>) -> Result<String, ClientError> {
    let seen = self.refreshes.load(Ordering::Acquire);
    let mut state = self.token.lock().await;
    if let Some(current) = state.token.as_ref() {
      let is_rejected = rejected.map(|r| r == current.value).unwrap_or(false);
      if current.is_valid() && !is_rejected {
        return Ok(current.value.clone());
      }
    }
    if self.refreshes.load(Ordering::Acquire) != seen {
      if let Some(err) = state.failure.clone() {
        debug!("sharing failed token refresh: {err}");
        return Err(err);
      }
    }

    state.token = None;
    let outcome = self.authenticate().await;
    self.refreshes.fetch_add(1, Ordering::Release);
    match outcome {
      Ok(fresh) => {
        let value = fresh.value.clone();
        state.token = Some(fresh);
        state.failure = None;
        Ok(value)
      }
      Err(err) => {
        state.failure = Some(err.clone());
        Err(err)
      }
    }
  }

  async fn send(
    &self,
    path: &str,
    query: &[(&str, String)],
    bearer: &str,
  ) -> Result<Response, ClientError> {
    let mut req = self
      .http
      .get(format!("{}{}", self.base_url, path))
      .bearer_auth(bearer);
    if !query.is_empty() {
      req = req.query(query);
    }
    Ok(req.send().await?)
  }

  async fn api_call<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T, ClientError> {
    let bearer = self.bearer(None).await?;
    let mut resp = self.send(path, query, &bearer).await?;

    if is_auth_expired(resp.status()) {
      debug!("autorouter token rejected on {path}, re-authenticating");
      let bearer = self.bearer(Some(&bearer)).await?;
      resp = self.send(path, query, &bearer).await?;
      if is_auth_expired(resp.status()) {
        let (_, description) = describe_failure(resp).await;
        return Err(ClientError::AuthRejected(description));
      }
    }

    if !resp.status().is_success() {
      let (status, description) = describe_failure(resp).await;
      return Err(ClientError::Fetch {
        status,
        description,
      });
    }
    Ok(resp.json::<T>().await?)
  }

  pub async fn get_weather(&self, icao: &str) -> Result<MetarTaf, ClientError> {
    self
      .api_call(&format!("/met/metartaf/{}", icao.trim().to_uppercase()), &[])
      .await
  }

  pub async fn get_notams(
    &self,
    icao: &str,
    offset: u32,
    limit: u32,
  ) -> Result<NotamPage, ClientError> {
    let itemas = serde_json::json!([icao.trim().to_uppercase()]).to_string();
    self
      .api_call(
        "/notam",
        &[
          ("itemas", itemas),
          ("offset", offset.to_string()),
          ("limit", limit.to_string()),
        ],
      )
      .await
  }
}

fn is_auth_expired(status: StatusCode) -> bool {
  status == StatusCode::FORBIDDEN || status == StatusCode::UNAUTHORIZED
}

async fn describe_failure(resp: Response) -> (u16, String) {
  let status = resp.status().as_u16();
  let body = resp.json::<ErrorResponse>().await.unwrap_or_default();
  let description = body
    .error_description
    .or(body.error)
    .unwrap_or_else(|| "API call failed".to_owned());
  (status, description)
}
