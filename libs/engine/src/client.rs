use std::sync::Arc;

use relaykit_config::ClientConfig;
use tracing::{error, info};

use crate::{
  error::PipelineError,
  operations::{
    post_preview::{PostPreview, PostPreviewQuery},
    story::{CreatedStory, StoryCreate, StoryReply, StoryReplyReceipt},
  },
  pipeline::Pipeline,
  transport::{HttpTransport, TransportError},
  validator::LoginCheckValidator,
};

/// The operations of the platform, bound to one session.
///
/// Cloning is cheap, clones share the session and the HTTP client.
#[derive(Debug, Clone)]
pub struct RelayClient {
  pipeline: Pipeline,
}

impl RelayClient {
  pub fn new(pipeline: Pipeline) -> Self {
    Self { pipeline }
  }

  /// Builds a client talking to the configured endpoint over HTTP, its HTTP client shares the
  /// session's cookie jar.
  pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
    let session = config.session.to_session_context(&config.endpoint);
    let transport = HttpTransport::from_config(config, &session)?;

    Ok(Self::new(Pipeline::new(
      config.endpoint.clone(),
      session,
      Arc::new(transport),
      Arc::new(LoginCheckValidator),
    )))
  }

  pub fn pipeline(&self) -> &Pipeline {
    &self.pipeline
  }

  #[tracing::instrument(level = "debug", skip(self), name = "RelayClient::get_post_preview")]
  pub async fn get_post_preview(&self, post_id: &str) -> Result<PostPreview, PipelineError> {
    let outcome = match PostPreviewQuery::new(post_id) {
      Ok(query) => self.pipeline.execute(&query).await,
      Err(e) => Err(e),
    };

    match &outcome {
      Ok(preview) => info!(post_id = %preview.post_id, "Generated preview for post"),
      Err(e) => error!("Failed to generate a preview for post {}: {}", post_id, e),
    }

    outcome
  }

  #[tracing::instrument(level = "debug", skip(self, message), name = "RelayClient::story_create")]
  pub async fn story_create(
    &self,
    message: &str,
    font: Option<&str>,
    background: Option<&str>,
  ) -> Result<CreatedStory, PipelineError> {
    let outcome = match StoryCreate::new(message, font, background) {
      Ok(story) => self.pipeline.execute(&story).await,
      Err(e) => Err(e),
    };

    match &outcome {
      Ok(created) => info!("Created story with ID {}", created.story_id),
      Err(e) => error!("Failed to create story: {}", e),
    }

    outcome
  }

  #[tracing::instrument(level = "debug", skip(self), name = "RelayClient::story_react")]
  pub async fn story_react(
    &self,
    story_id_or_url: &str,
    reaction: &str,
  ) -> Result<StoryReplyReceipt, PipelineError> {
    let outcome = match StoryReply::reaction(story_id_or_url, reaction) {
      Ok(reply) => self
        .pipeline
        .execute(&reply)
        .await
        .map(|receipt| (reply, receipt)),
      Err(e) => Err(e),
    };

    match outcome {
      Ok((reply, receipt)) => {
        info!("Reacted to story {} with {}", reply.story_id(), reaction);
        Ok(receipt)
      }
      Err(e) => {
        error!("Failed to react to story {}: {}", story_id_or_url, e);
        Err(e)
      }
    }
  }

  #[tracing::instrument(level = "debug", skip(self, message), name = "RelayClient::story_reply")]
  pub async fn story_reply(
    &self,
    story_id_or_url: &str,
    message: &str,
  ) -> Result<StoryReplyReceipt, PipelineError> {
    let outcome = match StoryReply::text(story_id_or_url, message) {
      Ok(reply) => self
        .pipeline
        .execute(&reply)
        .await
        .map(|receipt| (reply, receipt)),
      Err(e) => Err(e),
    };

    match outcome {
      Ok((reply, receipt)) => {
        info!("Replied to story {}", reply.story_id());
        Ok(receipt)
      }
      Err(e) => {
        error!("Failed to reply to story {}: {}", story_id_or_url, e);
        Err(e)
      }
    }
  }
}
