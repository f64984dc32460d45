//! Throwaway rocket app standing in for the remote API in tests
use rocket::{
  config::{LogLevel, Shutdown},
  fairing::AdHoc,
  get,
  http::{uri::Origin, ContentType, Status},
  post,
  request::{FromRequest, Outcome},
  routes, Request, State,
};
use std::{
  convert::Infallible,
  net::{Ipv4Addr, TcpListener},
};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub struct StubRequest {
  pub method: &'static str,
  pub target: String,
  pub authorization: Option<String>,
  pub body: String,
}

impl StubRequest {
  pub fn has_bearer(&self, token: &str) -> bool {
    self
      .authorization
      .as_deref()
      .map(|auth| auth.eq_ignore_ascii_case(&format!("Bearer {token}")))
      .unwrap_or(false)
  }
}

type Reply = (Status, (ContentType, String));

struct StubHandler(Box<dyn Fn(&StubRequest) -> (u16, String) + Send + Sync>);

impl StubHandler {
  fn reply(&self, req: StubRequest) -> Reply {
    let (code, payload) = (self.0)(&req);
    (Status::new(code), (ContentType::JSON, payload))
  }
}

struct Authorization(Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authorization {
  type Error = Infallible;

  async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
    let value = req.headers().get_one("Authorization").map(|v| v.to_owned());
    Outcome::Success(Authorization(value))
  }
}

#[get("/<_..>")]
fn get_any(uri: &Origin<'_>, auth: Authorization, handler: &State<StubHandler>) -> Reply {
  handler.reply(StubRequest {
    method: "GET",
    target: uri.to_string(),
    authorization: auth.0,
    body: String::new(),
  })
}

#[post("/<_..>", data = "<body>")]
fn post_any(
  uri: &Origin<'_>,
  auth: Authorization,
  body: String,
  handler: &State<StubHandler>,
) -> Reply {
  handler.reply(StubRequest {
    method: "POST",
    target: uri.to_string(),
    authorization: auth.0,
    body,
  })
}

fn free_port() -> u16 {
  TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
    .and_then(|l| l.local_addr())
    .map(|addr| addr.port())
    .unwrap()
}

/// Serves every request with `handler` and returns the base url once
/// the server is accepting connections
pub async fn serve<F>(handler: F) -> String
where
  F: Fn(&StubRequest) -> (u16, String) + Send + Sync + 'static,
{
  let port = free_port();
  let config = rocket::Config {
    address: Ipv4Addr::LOCALHOST.into(),
    port,
    log_level: LogLevel::Off,
    shutdown: Shutdown {
      ctrlc: false,
      ..Default::default()
    },
    ..rocket::Config::debug_default()
  };

  let (ready_tx, ready_rx) = oneshot::channel();
  let server = rocket::custom(config)
    .manage(StubHandler(Box::new(handler)))
    .mount("/", routes![get_any, post_any])
    .attach(AdHoc::on_liftoff("stub ready", move |_| {
      Box::pin(async move {
        let _ = ready_tx.send(());
      })
    }));

  tokio::spawn(server.launch());
  ready_rx.await.unwrap();
  format!("http://127.0.0.1:{port}")
}
