use std::fmt::Debug;

use relaykit_common::{
  graphql::GraphQLResponse,
  http::{RawResponse, Url, LOCATION},
  json::parse_and_extract_json_map_value,
  session::SessionContext,
};
use serde_json::Value;
use tracing::warn;

use crate::{error::PipelineError, transport::TransportError};

/// Top-level `error` codes the platform uses for a logged out or expired session.
pub const SESSION_INVALID_ERROR_CODES: [i64; 2] = [1357001, 1357004];

const LOGIN_PATH_MARKERS: [&str; 2] = ["/login", "/checkpoint"];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
  #[error("redirected to {0}")]
  RedirectedToLogin(String),
  #[error("not logged in (error {code}): {summary}")]
  NotLoggedIn { code: i64, summary: String },
}

#[derive(thiserror::Error, Debug)]
pub enum ResponseCheckError {
  #[error(transparent)]
  Session(#[from] SessionError),
  #[error(transparent)]
  Transport(#[from] TransportError),
}

impl From<ResponseCheckError> for PipelineError {
  fn from(error: ResponseCheckError) -> Self {
    match error {
      ResponseCheckError::Session(e) => PipelineError::Session(e),
      ResponseCheckError::Transport(e) => PipelineError::Transport(e),
    }
  }
}

/// Decides whether a raw response can be trusted, and decodes it.
pub trait ResponseValidator: Debug + Send + Sync + 'static {
  fn validate(
    &self,
    response: RawResponse,
    session: &SessionContext,
  ) -> Result<GraphQLResponse, ResponseCheckError>;
}

/// Detects logged out sessions, either from a redirect to the login flow or from the error codes
/// the platform returns in place of a GraphQL payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoginCheckValidator;

fn is_login_url(url: &Url) -> bool {
  let path = url.path();
  LOGIN_PATH_MARKERS
    .iter()
    .any(|marker| path.starts_with(marker))
}

fn without_query(url: &Url) -> String {
  format!("{}{}", url.origin().ascii_serialization(), url.path())
}

impl ResponseValidator for LoginCheckValidator {
  #[tracing::instrument(level = "debug", skip_all, name = "LoginCheckValidator::validate")]
  fn validate(
    &self,
    response: RawResponse,
    session: &SessionContext,
  ) -> Result<GraphQLResponse, ResponseCheckError> {
    if is_login_url(&response.url) {
      warn!(user_id = session.user_id(), "session was redirected to the login flow");
      return Err(SessionError::RedirectedToLogin(without_query(&response.url)).into());
    }

    if response.status.is_redirection() {
      let location = response
        .headers
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| response.url.join(value).ok());

      if let Some(location) = location.filter(is_login_url) {
        warn!(user_id = session.user_id(), "session was redirected to the login flow");
        return Err(SessionError::RedirectedToLogin(without_query(&location)).into());
      }
    }

    if !response.status.is_success() {
      return Err(
        TransportError::UnexpectedHTTPStatusError {
          status: response.status,
          body: response.body_preview(),
        }
        .into(),
      );
    }

    let body =
      parse_and_extract_json_map_value(&response.body).map_err(TransportError::MalformedPayload)?;

    if let Some(code) = body.get("error").and_then(Value::as_i64) {
      if SESSION_INVALID_ERROR_CODES.contains(&code) {
        let summary = body
          .get("errorSummary")
          .and_then(Value::as_str)
          .unwrap_or("session expired")
          .to_string();
        warn!(user_id = session.user_id(), code, "platform reported the session as logged out");

        return Err(SessionError::NotLoggedIn { code, summary }.into());
      }
    }

    serde_json::from_value::<GraphQLResponse>(Value::Object(body))
      .map_err(|e| TransportError::MalformedPayload(e).into())
  }
}
