use super::{KeyValueStore, StoreError};
use crate::{
  coords::{check_precision, CoordinateFormat, DisplaySettings},
  types::{GeoPoint, LocationRole},
  weather::client::Credentials,
};
use log::warn;
use serde_json::Value;

pub const FORMAT_KEY: &str = "fmf-format";
pub const PRECISION_KEY: &str = "fmf-precision";
pub const EMAIL_KEY: &str = "fmf-autorouter-email";
pub const SECRET_KEY: &str = "fmf-autorouter-key";
pub const LEGACY_API_KEY: &str = "autorouter-api-key";

impl KeyValueStore {
  /// Stored display preferences, `defaults` fill in whatever is absent
  pub fn display_settings(&self, defaults: DisplaySettings) -> DisplaySettings {
    let format = self
      .get::<String>(FORMAT_KEY)
      .and_then(|f| f.parse::<CoordinateFormat>().ok())
      .unwrap_or(defaults.format);

    // older writers stored the precision as a string
    let precision = match self.get_raw(PRECISION_KEY) {
      Some(Value::Number(n)) => n.as_u64().map(|p| p as usize),
      Some(Value::String(s)) => s.trim().parse::<usize>().ok(),
      _ => None,
    }
    .and_then(|p| check_precision(p).ok())
    .unwrap_or(defaults.precision);

    DisplaySettings { format, precision }
  }

  pub fn save_format(&self, format: CoordinateFormat) -> Result<(), StoreError> {
    self.set(FORMAT_KEY, &format.as_str())
  }

  /// Callers validate with `check_precision`, reads apply the same range
  pub fn save_precision(&self, precision: usize) -> Result<(), StoreError> {
    self.set(PRECISION_KEY, &precision)
  }

  pub fn location(&self, role: LocationRole) -> Option<GeoPoint> {
    let point = self.get::<GeoPoint>(role.storage_key())?;
    match GeoPoint::new(point.lat, point.lng) {
      Ok(point) => Some(point),
      Err(err) => {
        warn!("ignoring stored {role} location: {err}");
        None
      }
    }
  }

  pub fn save_location(&self, role: LocationRole, point: &GeoPoint) -> Result<(), StoreError> {
    self.set(role.storage_key(), point)
  }

  pub fn credentials(&self) -> Option<Credentials> {
    let email = self.get::<String>(EMAIL_KEY).filter(|e| !e.is_empty())?;
    let api_key = self
      .get::<String>(SECRET_KEY)
      .or_else(|| self.get::<String>(LEGACY_API_KEY))
      .filter(|k| !k.is_empty())?;
    Some(Credentials { email, api_key })
  }

  pub fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
    self.set(EMAIL_KEY, &credentials.email)?;
    self.set(SECRET_KEY, &credentials.api_key)
  }

  pub fn clear_credentials(&self) -> Result<(), StoreError> {
    self.remove(EMAIL_KEY)?;
    self.remove(SECRET_KEY)?;
    self.remove(LEGACY_API_KEY)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display_settings() {
    let store = KeyValueStore::in_memory();
    assert_eq!(
      store.display_settings(DisplaySettings::default()),
      DisplaySettings::default()
    );

    store.save_format(CoordinateFormat::DDM).unwrap();
    store.set(PRECISION_KEY, &"2").unwrap();
    let settings = store.display_settings(DisplaySettings::default());
    assert_eq!(settings.format, CoordinateFormat::DDM);
    assert_eq!(settings.precision, 2);

    store.set(PRECISION_KEY, &"lots").unwrap();
    store.set(FORMAT_KEY, &"utm").unwrap();
    assert_eq!(
      store.display_settings(DisplaySettings::default()),
      DisplaySettings::default()
    );
  }

  #[test]
  fn test_locations_overwrite() {
    let store = KeyValueStore::in_memory();
    assert!(store.location(LocationRole::Fire).is_none());

    let first = GeoPoint {
      lat: 34.1,
      lng: -118.3,
    };
    let second = GeoPoint {
      lat: 34.2,
      lng: -118.4,
    };
    store.save_location(LocationRole::Fire, &first).unwrap();
    store.save_location(LocationRole::Fire, &second).unwrap();
    assert_eq!(store.location(LocationRole::Fire), Some(second));
    assert!(store.location(LocationRole::Base).is_none());

    store
      .set(LocationRole::Base.storage_key(), &GeoPoint { lat: 123.0, lng: 0.0 })
      .unwrap();
    assert!(store.location(LocationRole::Base).is_none());
  }

  #[test]
  fn test_credentials() {
    let store = KeyValueStore::in_memory();
    assert!(store.credentials().is_none());

    store.set(EMAIL_KEY, &"ops@example.org").unwrap();
    store.set(LEGACY_API_KEY, &"legacy").unwrap();
    assert_eq!(store.credentials().unwrap().api_key, "legacy");

    let creds = Credentials {
      email: "ops@example.org".into(),
      api_key: "fresh".into(),
    };
    store.save_credentials(&creds).unwrap();
    assert_eq!(store.credentials(), Some(creds));

    store.clear_credentials().unwrap();
    assert!(store.credentials().is_none());
  }
}
