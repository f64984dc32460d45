use crate::{
  coords::error::FormatError, manager::UpdateError, persistent::StoreError,
  weather::client::ClientError,
};
use rocket::{
  catch,
  http::Status,
  response::{status::Custom, Responder},
  serde::json::json,
};

#[derive(Debug)]
pub struct APIError {
  pub code: u16,
  pub message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for APIError {
  fn respond_to(self, request: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
    let resp = Custom(
      Status { code: self.code },
      json!({
        "error": self.message
      }),
    );
    resp.respond_to(request)
  }
}

impl From<FormatError> for APIError {
  fn from(err: FormatError) -> Self {
    bad_request(&err.to_string())
  }
}

impl From<StoreError> for APIError {
  fn from(err: StoreError) -> Self {
    api_error(500, &format!("error saving preferences: {err}"))
  }
}

impl From<UpdateError> for APIError {
  fn from(err: UpdateError) -> Self {
    match err {
      UpdateError::Format(err) => err.into(),
      UpdateError::Store(err) => err.into(),
    }
  }
}

impl From<ClientError> for APIError {
  fn from(err: ClientError) -> Self {
    let code = match &err {
      ClientError::MissingCredentials | ClientError::AuthRejected(_) => 401,
      ClientError::Fetch { status: 404, .. } => 404,
      _ => 502,
    };
    api_error(code, &err.to_string())
  }
}

pub fn api_error(code: u16, message: &str) -> APIError {
  APIError {
    code,
    message: message.into(),
  }
}

pub fn not_found(message: &str) -> APIError {
  api_error(404, message)
}

pub fn bad_request(message: &str) -> APIError {
  api_error(400, message)
}

#[catch(404)]
pub fn catch404() -> APIError {
  not_found("not found")
}

#[catch(500)]
pub fn catch500() -> APIError {
  api_error(500, "internal server error")
}
