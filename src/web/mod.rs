pub mod error;
mod types;

use self::{
  error::{api_error, bad_request, catch404, catch500, not_found, APIError},
  types::{
    AirportSearchHit, FormattedPoint, LocationUpdate, LocationsResponse, NavView, PlacedPoint,
    PreferencesUpdate, StatusResponse,
  },
};
use crate::{
  coords::{parser::parse_free_text, parser::FreeTextParse, DisplaySettings},
  fixed::types::{AirportInfo, NearbyAirport},
  manager::{LocationInput, Manager},
  types::{GeoPoint, LocationRole},
  weather::{client::Credentials, ext_types::NotamPage, AirportAssessment, WeatherInfo},
};
use log::{debug, info};
use rocket::{delete, get, put, routes, serde::json::Json, Build, Rocket, State};
use std::sync::Arc;
use tokio::task;

const SEARCH_LIMIT: usize = 20;
const NOTAM_PAGE_LIMIT: u32 = 10;

fn placed(manager: &Manager, point: Option<GeoPoint>) -> Option<PlacedPoint> {
  point.map(|point| PlacedPoint {
    formatted: manager.format_point(&point),
    point,
  })
}

/// Store writes are blocking file I/O, keep them off the async workers
async fn on_blocking_pool<T, F>(manager: &State<Arc<Manager>>, f: F) -> Result<T, APIError>
where
  F: FnOnce(&Manager) -> Result<T, APIError> + Send + 'static,
  T: Send + 'static,
{
  let manager = manager.inner().clone();
  task::spawn_blocking(move || f(&manager))
    .await
    .map_err(|err| api_error(500, &format!("storage task failed: {err}")))?
}

fn locations(manager: &Manager) -> LocationsResponse {
  LocationsResponse {
    fire: placed(manager, manager.location(LocationRole::Fire)),
    base: placed(manager, manager.location(LocationRole::Base)),
    nav: manager.nav_solution().map(NavView::from),
  }
}

#[get("/airports/<code>")]
pub async fn get_airport(code: String, manager: &State<Arc<Manager>>) -> Option<Json<AirportInfo>> {
  manager.airports().find_airport(&code).map(|a| Json(a.info()))
}

#[get("/airports?<q>")]
pub async fn search_airports(q: String, manager: &State<Arc<Manager>>) -> Json<Vec<AirportSearchHit>> {
  let settings = manager.display_settings();
  let hits = manager
    .airports()
    .search(&q, SEARCH_LIMIT)
    .into_iter()
    .map(|a| AirportSearchHit::new(a, &settings))
    .collect::<Vec<_>>();
  debug!("airport search {q:?} returned {} hits", hits.len());
  Json(hits)
}

#[get("/nearby?<lat>&<lng>&<radius>")]
pub async fn nearby(
  lat: f64,
  lng: f64,
  radius: Option<f64>,
  manager: &State<Arc<Manager>>,
) -> Result<Json<Vec<NearbyAirport>>, APIError> {
  let point = GeoPoint::new(lat, lng)?;
  if let Some(radius) = radius {
    if !(radius >= 0.0) {
      return Err(bad_request("radius must be a non-negative number of nautical miles"));
    }
  }
  Ok(Json(manager.find_nearby(&point, radius)))
}

#[get("/parse?<text>")]
pub async fn parse_text(text: String) -> Json<FreeTextParse> {
  Json(parse_free_text(&text))
}

#[get("/format?<lat>&<lng>")]
pub async fn format_point(
  lat: f64,
  lng: f64,
  manager: &State<Arc<Manager>>,
) -> Result<Json<FormattedPoint>, APIError> {
  let point = GeoPoint::new(lat, lng)?;
  let settings = manager.display_settings();
  Ok(Json(FormattedPoint {
    text: settings.format_point(&point),
    settings,
  }))
}

#[get("/locations")]
pub async fn get_locations(manager: &State<Arc<Manager>>) -> Json<LocationsResponse> {
  Json(locations(manager))
}

#[put("/locations/<role>", data = "<update>")]
pub async fn put_location(
  role: LocationRole,
  update: Json<LocationUpdate>,
  manager: &State<Arc<Manager>>,
) -> Result<Json<LocationsResponse>, APIError> {
  let input: LocationInput = update.into_inner().into();
  let placed = on_blocking_pool(manager, move |m| {
    m.set_location(role, input)?;
    Ok(locations(m))
  })
  .await?;
  Ok(Json(placed))
}

#[get("/nav")]
pub async fn get_nav(manager: &State<Arc<Manager>>) -> Result<Json<NavView>, APIError> {
  manager
    .nav_solution()
    .map(|nav| Json(nav.into()))
    .ok_or_else(|| not_found("both fire and base locations are required"))
}

#[get("/assessment")]
pub async fn get_assessment(
  manager: &State<Arc<Manager>>,
) -> Result<Json<Vec<AirportAssessment>>, APIError> {
  manager
    .assess_fire_area()
    .await
    .map(Json)
    .ok_or_else(|| not_found("fire location is not set"))
}

#[put("/preferences", data = "<update>")]
pub async fn put_preferences(
  update: Json<PreferencesUpdate>,
  manager: &State<Arc<Manager>>,
) -> Result<Json<DisplaySettings>, APIError> {
  let PreferencesUpdate { format, precision } = update.into_inner();
  let settings = on_blocking_pool(manager, move |m| Ok(m.set_display(format, precision)?)).await?;
  info!("display set to {} with precision {}", settings.format, settings.precision);
  Ok(Json(settings))
}

#[put("/credentials", data = "<credentials>")]
pub async fn put_credentials(
  credentials: Json<Credentials>,
  manager: &State<Arc<Manager>>,
) -> Result<Json<StatusResponse>, APIError> {
  let credentials = credentials.into_inner();
  if credentials.email.trim().is_empty() || credentials.api_key.trim().is_empty() {
    return Err(bad_request("email and api key are both required"));
  }
  manager.set_credentials(credentials).await?;
  Ok(Json(StatusResponse { status: "ok" }))
}

#[delete("/credentials")]
pub async fn delete_credentials(
  manager: &State<Arc<Manager>>,
) -> Result<Json<StatusResponse>, APIError> {
  manager.clear_credentials().await?;
  Ok(Json(StatusResponse { status: "ok" }))
}

#[get("/weather/<icao>")]
pub async fn get_weather(
  icao: String,
  manager: &State<Arc<Manager>>,
) -> Result<Json<WeatherInfo>, APIError> {
  Ok(Json(manager.weather().get(&icao).await?))
}

#[get("/notams/<icao>?<offset>&<limit>")]
pub async fn get_notams(
  icao: String,
  offset: Option<u32>,
  limit: Option<u32>,
  manager: &State<Arc<Manager>>,
) -> Result<Json<NotamPage>, APIError> {
  let page = manager
    .weather()
    .client()
    .get_notams(&icao, offset.unwrap_or(0), limit.unwrap_or(NOTAM_PAGE_LIMIT))
    .await?;
  Ok(Json(page))
}

pub fn build(manager: Arc<Manager>) -> Rocket<Build> {
  rocket::build()
    .manage(manager)
    .mount(
      "/api",
      routes![
        get_airport,
        search_airports,
        nearby,
        parse_text,
        format_point,
        get_locations,
        put_location,
        get_nav,
        get_assessment,
        put_preferences,
        put_credentials,
        delete_credentials,
        get_weather,
        get_notams
      ],
    )
    .register("/", rocket::catchers![catch404, catch500])
}
