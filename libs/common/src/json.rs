use serde::de::Error as DeError;
use serde_json::{Deserializer, Error as SerdeError, Map, Value};

/// Prefix the platform puts in front of JSON bodies to prevent them from being evaluated as script.
pub const JSON_HIJACKING_GUARD: &[u8] = b"for (;;);";

pub fn strip_json_guard(body: &[u8]) -> &[u8] {
  let start = body
    .iter()
    .position(|b| !b.is_ascii_whitespace())
    .unwrap_or(body.len());
  let body = &body[start..];

  body.strip_prefix(JSON_HIJACKING_GUARD).unwrap_or(body)
}

/// Parses the first JSON document of the body and expects it to be an object.
///
/// Some responses are streamed as several JSON documents one after the other, only the first
/// one carries the operation result.
pub fn parse_and_extract_json_map_value(body: &[u8]) -> Result<Map<String, Value>, SerdeError> {
  let mut documents = Deserializer::from_slice(strip_json_guard(body)).into_iter::<Value>();

  match documents.next() {
    Some(Ok(Value::Object(v))) => Ok(v),
    Some(Ok(_)) => Err(DeError::custom("expected object")),
    Some(Err(e)) => Err(e),
    None => Err(DeError::custom("empty body")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn guard_is_stripped() {
    let parsed = parse_and_extract_json_map_value(b"for (;;);{\"data\":{}}").unwrap();
    assert_eq!(parsed.get("data"), Some(&json!({})));
  }

  #[test]
  fn plain_json_is_untouched() {
    assert_eq!(strip_json_guard(b"  {\"a\":1}"), b"{\"a\":1}");
  }

  #[test]
  fn only_first_document_is_used() {
    let parsed =
      parse_and_extract_json_map_value(b"{\"data\":{\"x\":1}}\r\n{\"label\":\"deferred\"}").unwrap();
    assert_eq!(parsed.get("data"), Some(&json!({ "x": 1 })));
  }

  #[test]
  fn non_object_and_empty_bodies_fail() {
    assert!(parse_and_extract_json_map_value(b"[1,2]").is_err());
    assert!(parse_and_extract_json_map_value(b"   ").is_err());
    assert!(parse_and_extract_json_map_value(b"<html>").is_err());
  }
}
