pub mod post_preview;
pub mod story;
pub mod story_reference;

use relaykit_common::session::SessionContext;
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use crate::{
  error::ShapeError,
  request_builder::{AuthMode, OperationDescriptor},
};

/// A pre-registered GraphQL operation, identified on the server by `DOC_ID`.
///
/// Values of an operation type are only constructed from valid input, so everything that can be
/// rejected is rejected before a request is built.
pub trait GraphQLOperation: Send + Sync {
  type Output: Send;

  const FRIENDLY_NAME: &'static str;
  const DOC_ID: &'static str;
  const AUTH: AuthMode;

  fn variables(&self, session: &SessionContext) -> Value;

  /// Projects the `data` node of a response without declared errors into the output.
  fn extract(&self, data: Option<Value>) -> Result<Self::Output, ShapeError>;

  fn descriptor(&self, session: &SessionContext) -> OperationDescriptor {
    OperationDescriptor {
      friendly_name: Self::FRIENDLY_NAME,
      doc_id: Self::DOC_ID,
      variables: self.variables(session),
      auth: Self::AUTH,
    }
  }
}

/// Decodes `data` into the typed response shape of an operation.
pub(crate) fn decode_shape<T: DeserializeOwned>(
  data: Option<Value>,
  path: &'static str,
) -> Result<T, ShapeError> {
  match data {
    None | Some(Value::Null) => Err(ShapeError::missing(path)),
    Some(data) => serde_json::from_value(data).map_err(|e| ShapeError::malformed(path, e)),
  }
}

/// Ids are sometimes sent as numbers, sometimes as strings.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Value>::deserialize(deserializer)? {
    Some(Value::String(s)) => Ok(Some(s)),
    Some(Value::Number(n)) => Ok(Some(n.to_string())),
    _ => Ok(None),
  }
}
