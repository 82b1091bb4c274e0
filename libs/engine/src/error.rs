use std::fmt::Display;

use relaykit_common::graphql::GraphQLError;
use serde_json::{json, Value};

use crate::{transport::TransportError, validator::SessionError};

/// The expected data node of an operation is missing from an otherwise valid response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error(
  "could not find {path} in response{}",
  .reason.as_ref().map(|reason| format!(" ({})", reason)).unwrap_or_default()
)]
pub struct ShapeError {
  pub path: &'static str,
  pub reason: Option<String>,
}

impl ShapeError {
  pub fn missing(path: &'static str) -> Self {
    ShapeError { path, reason: None }
  }

  pub fn malformed(path: &'static str, reason: impl Display) -> Self {
    ShapeError {
      path,
      reason: Some(reason.to_string()),
    }
  }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
  /// The call was rejected before anything was sent.
  #[error("{0}")]
  Validation(String),
  #[error("session is no longer valid: {0}")]
  Session(#[from] SessionError),
  #[error(transparent)]
  Transport(#[from] TransportError),
  /// First entry of the `errors` array declared by the platform.
  #[error("GraphQL error: {0}")]
  Application(GraphQLError),
  #[error(transparent)]
  Shape(#[from] ShapeError),
  #[error("failed to encode operation variables: {0}")]
  Build(serde_json::Error),
}

impl PipelineError {
  pub fn validation(message: impl Into<String>) -> Self {
    PipelineError::Validation(message.into())
  }

  pub fn is_session_error(&self) -> bool {
    matches!(self, PipelineError::Session(_))
  }

  /// The normalized `{ "error": ... }` object handed to callers that only deal with JSON.
  pub fn to_error_object(&self) -> Value {
    match self {
      PipelineError::Application(graphql_error) => json!({
        "error": self.to_string(),
        "details": graphql_error,
      }),
      _ => json!({ "error": self.to_string() }),
    }
  }
}
