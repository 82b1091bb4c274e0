use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An entry of the `errors` array returned by the GraphQL endpoint.
///
/// The platform adds its own fields next to `message` (`code`, `severity`, `summary`, ...), these
/// are preserved in `extra` so the error can be surfaced verbatim. Entries that are not objects
/// are kept as the message.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(from = "GraphQLErrorEntry")]
pub struct GraphQLError {
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub extensions: Option<Map<String, Value>>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct GraphQLErrorObject {
  #[serde(default)]
  message: String,
  extensions: Option<Map<String, Value>>,
  #[serde(flatten)]
  extra: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GraphQLErrorEntry {
  Object(GraphQLErrorObject),
  Other(Value),
}

impl From<GraphQLErrorEntry> for GraphQLError {
  fn from(entry: GraphQLErrorEntry) -> Self {
    match entry {
      GraphQLErrorEntry::Object(GraphQLErrorObject {
        message,
        extensions,
        extra,
      }) => GraphQLError {
        message,
        extensions,
        extra,
      },
      GraphQLErrorEntry::Other(Value::String(message)) => GraphQLError::new(&message),
      GraphQLErrorEntry::Other(value) => GraphQLError::new(&value.to_string()),
    }
  }
}

impl Display for GraphQLError {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    if !self.message.is_empty() {
      return write!(f, "{}", self.message);
    }

    match self.extra.get("summary").and_then(Value::as_str) {
      Some(summary) => write!(f, "{}", summary),
      None => write!(f, "{}", Value::Object(self.extra.clone())),
    }
  }
}

impl GraphQLError {
  pub fn new(message: &str) -> Self {
    GraphQLError {
      message: message.to_string(),
      extensions: None,
      extra: Map::new(),
    }
  }
}

/// The decoded body of a GraphQL response: `{ data?: object, errors?: array }`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct GraphQLResponse {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data: Option<Value>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub errors: Option<Vec<GraphQLError>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub extensions: Option<Value>,
}

impl GraphQLResponse {
  pub fn new_data(data: Value) -> Self {
    GraphQLResponse {
      data: Some(data),
      errors: None,
      extensions: None,
    }
  }

  pub fn new_error(error: &str) -> Self {
    GraphQLResponse {
      data: None,
      errors: Some(vec![GraphQLError::new(error)]),
      extensions: None,
    }
  }

  /// Returns the first declared error, `None` when `errors` is absent or empty.
  pub fn first_error(&self) -> Option<&GraphQLError> {
    self.errors.as_ref().and_then(|errors| errors.first())
  }

  pub fn has_errors(&self) -> bool {
    self.first_error().is_some()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn empty_errors_array_is_not_an_error() {
    let response: GraphQLResponse =
      serde_json::from_value(json!({ "data": { "a": 1 }, "errors": [] })).unwrap();

    assert!(!response.has_errors());
    assert_eq!(response.data, Some(json!({ "a": 1 })));
  }

  #[test]
  fn platform_error_fields_are_preserved() {
    let response: GraphQLResponse = serde_json::from_value(json!({
      "errors": [
        { "message": "first", "code": 1675004, "severity": "CRITICAL" },
        { "message": "second" }
      ]
    }))
    .unwrap();

    let first = response.first_error().unwrap();
    assert_eq!(first.message, "first");
    assert_eq!(first.extra.get("code"), Some(&json!(1675004)));
    assert_eq!(first.to_string(), "first");
  }

  #[test]
  fn bare_string_entries_become_the_message() {
    let response: GraphQLResponse =
      serde_json::from_value(json!({ "errors": ["Rate limit exceeded", 42] })).unwrap();
    let errors = response.errors.unwrap();

    assert_eq!(errors[0], GraphQLError::new("Rate limit exceeded"));
    assert_eq!(errors[1].message, "42");
  }

  #[test]
  fn error_without_message_displays_summary() {
    let error: GraphQLError =
      serde_json::from_value(json!({ "summary": "Rate limited", "code": 368 })).unwrap();

    assert_eq!(error.to_string(), "Rate limited");
  }
}
