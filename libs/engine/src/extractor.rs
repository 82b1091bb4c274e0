use relaykit_common::graphql::GraphQLResponse;

use crate::{error::PipelineError, operations::GraphQLOperation};

/// Turns a validated payload into the result of `operation`.
///
/// Declared GraphQL errors win over everything else: when `errors` is non-empty the first entry
/// is the failure, even if a data node is present too. Only then is the data node looked up.
pub fn extract_result<O: GraphQLOperation>(
  operation: &O,
  payload: GraphQLResponse,
) -> Result<O::Output, PipelineError> {
  let GraphQLResponse { data, errors, .. } = payload;

  if let Some(first_error) = errors.and_then(|errors| errors.into_iter().next()) {
    return Err(PipelineError::Application(first_error));
  }

  operation.extract(data).map_err(PipelineError::from)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::operations::{post_preview::PostPreviewQuery, story::StoryCreate};
  use serde_json::json;

  fn payload(value: serde_json::Value) -> GraphQLResponse {
    serde_json::from_value(value).unwrap()
  }

  #[test]
  fn first_error_wins_over_present_data() {
    let result = extract_result(
      &PostPreviewQuery::new("1").unwrap(),
      payload(json!({
        "data": { "xma_preview_data": { "post_id": "1", "title_text": "hi" } },
        "errors": [{ "message": "first" }, { "message": "second" }]
      })),
    );

    match result {
      Err(PipelineError::Application(error)) => assert_eq!(error.message, "first"),
      other => panic!("expected an application error, got {:?}", other),
    }
  }

  #[test]
  fn empty_errors_array_falls_through_to_data() {
    let result = extract_result(
      &PostPreviewQuery::new("1").unwrap(),
      payload(json!({
        "data": { "xma_preview_data": { "post_id": "1" } },
        "errors": []
      })),
    );

    assert!(result.is_ok());
  }

  #[test]
  fn missing_node_is_a_shape_error() {
    let result = extract_result(
      &StoryCreate::new("hello", None, None).unwrap(),
      payload(json!({ "data": { "story_create": null } })),
    );

    match result {
      Err(PipelineError::Shape(error)) => assert!(error.to_string().contains("could not find")),
      other => panic!("expected a shape error, got {:?}", other),
    }
  }

  #[test]
  fn missing_data_is_a_shape_error() {
    let result = extract_result(&PostPreviewQuery::new("1").unwrap(), payload(json!({})));

    assert!(matches!(result, Err(PipelineError::Shape(_))));
  }
}
