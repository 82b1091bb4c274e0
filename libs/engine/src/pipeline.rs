use std::sync::Arc;

use relaykit_common::{http::Url, session::SessionContext};
use tracing::{debug, Instrument};

use crate::{
  error::PipelineError,
  extractor::extract_result,
  operations::GraphQLOperation,
  request_builder::build_form,
  transport::Transport,
  validator::ResponseValidator,
};

/// Runs operations end to end: form building, transport, validation, then extraction.
///
/// Every stage reports through `PipelineError`, nothing is retried.
#[derive(Debug, Clone)]
pub struct Pipeline {
  endpoint: Url,
  session: Arc<SessionContext>,
  transport: Arc<dyn Transport>,
  validator: Arc<dyn ResponseValidator>,
}

impl Pipeline {
  pub fn new(
    endpoint: Url,
    session: SessionContext,
    transport: Arc<dyn Transport>,
    validator: Arc<dyn ResponseValidator>,
  ) -> Self {
    Self {
      endpoint,
      session: Arc::new(session),
      transport,
      validator,
    }
  }

  pub fn endpoint(&self) -> &Url {
    &self.endpoint
  }

  pub fn session(&self) -> &SessionContext {
    &self.session
  }

  pub async fn execute<O: GraphQLOperation>(&self, operation: &O) -> Result<O::Output, PipelineError> {
    let span = tracing::info_span!(
      "Pipeline::execute",
      operation = O::FRIENDLY_NAME,
      doc_id = O::DOC_ID
    );

    async move {
      let descriptor = operation.descriptor(&self.session);
      let form = build_form(&descriptor, &self.session).map_err(PipelineError::Build)?;

      debug!("operation form is ready");

      let response = self
        .transport
        .post(&self.endpoint, &form, &self.session)
        .await?;

      let payload = self.validator.validate(response, &self.session)?;

      extract_result(operation, payload)
    }
    .instrument(span)
    .await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    operations::{
      post_preview::PostPreviewQuery,
      story::{StoryCreate, StoryReply},
    },
    testing::StubTransport,
    validator::LoginCheckValidator,
  };
  use relaykit_common::http::StatusCode;

  fn pipeline(transport: Arc<StubTransport>) -> Pipeline {
    Pipeline::new(
      Url::parse("https://www.facebook.com/api/graphql/").unwrap(),
      SessionContext::default(),
      transport,
      Arc::new(LoginCheckValidator),
    )
  }

  #[tokio::test]
  async fn preview_round_trip() {
    let transport = Arc::new(StubTransport::ok(
      r#"{"data":{"xma_preview_data":{"post_id":"42","title_text":"Hello","favicon_url":"https://static.example/fav.ico"}}}"#,
    ));
    let preview = pipeline(transport.clone())
      .execute(&PostPreviewQuery::new("42").unwrap())
      .await
      .unwrap();

    assert_eq!(preview.post_id, "42");
    assert_eq!(preview.title.as_deref(), Some("Hello"));
    assert_eq!(transport.calls(), 1);

    let form = transport.last_form().unwrap();
    assert_eq!(
      form.get("fb_api_req_friendly_name"),
      Some("CometXMAProxyShareablePreviewQuery")
    );
    assert!(!form.contains_key("fb_dtsg"));
  }

  #[tokio::test]
  async fn mutations_carry_the_session_tokens() {
    let transport = Arc::new(StubTransport::ok(
      r#"for (;;);{"data":{"direct_message_reply":{"id":"1"}}}"#,
    ));
    let receipt = pipeline(transport.clone())
      .execute(&StoryReply::text("UzpfSVNDOjE5", "nice").unwrap())
      .await
      .unwrap();

    assert!(receipt.success);

    let form = transport.last_form().unwrap();
    assert_eq!(form.get("fb_dtsg"), Some("test-fb-dtsg"));
    assert_eq!(form.get("av"), Some("100000000000001"));
    assert_eq!(form.get("doc_id"), Some("9697491553691692"));
  }

  #[tokio::test]
  async fn declared_errors_fail_the_operation() {
    let transport = Arc::new(StubTransport::ok(
      r#"{"data":null,"errors":[{"message":"Something went wrong"}]}"#,
    ));
    let error = pipeline(transport)
      .execute(&StoryCreate::new("hi", None, None).unwrap())
      .await
      .unwrap_err();

    assert_eq!(error.to_string(), "GraphQL error: Something went wrong");
  }

  #[tokio::test]
  async fn bare_string_error_is_an_application_error() {
    let transport = Arc::new(StubTransport::ok(r#"{"errors":["Rate limit exceeded"]}"#));
    let error = pipeline(transport)
      .execute(&PostPreviewQuery::new("1").unwrap())
      .await
      .unwrap_err();

    match &error {
      PipelineError::Application(graphql_error) => {
        assert_eq!(graphql_error.message, "Rate limit exceeded")
      }
      other => panic!("expected an application error, got {:?}", other),
    }
    assert_eq!(error.to_string(), "GraphQL error: Rate limit exceeded");
  }

  #[tokio::test]
  async fn logged_out_session_is_reported() {
    let transport = Arc::new(StubTransport::ok(
      r#"for (;;);{"error":1357001,"errorSummary":"You're not logged in"}"#,
    ));
    let error = pipeline(transport)
      .execute(&PostPreviewQuery::new("1").unwrap())
      .await
      .unwrap_err();

    assert!(error.is_session_error());
  }

  #[tokio::test]
  async fn server_errors_are_transport_errors() {
    let transport = Arc::new(StubTransport::new(
      StatusCode::INTERNAL_SERVER_ERROR,
      "oops",
    ));
    let error = pipeline(transport)
      .execute(&PostPreviewQuery::new("1").unwrap())
      .await
      .unwrap_err();

    assert!(matches!(error, PipelineError::Transport(_)));
  }
}
