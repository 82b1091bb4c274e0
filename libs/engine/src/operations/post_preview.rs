use relaykit_common::session::SessionContext;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{decode_shape, opt_string_or_number, GraphQLOperation};
use crate::{
  error::{PipelineError, ShapeError},
  request_builder::AuthMode,
};

const PREVIEW_NODE_PATH: &str = "data.xma_preview_data";

/// Preview information of a post, as shown when the post is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPreview {
  #[serde(rename = "postID")]
  pub post_id: String,
  pub header: Option<String>,
  pub subtitle: Option<String>,
  pub title: Option<String>,
  #[serde(rename = "previewImage")]
  pub preview_image: Option<String>,
  pub favicon: Option<String>,
  #[serde(rename = "headerImage")]
  pub header_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewShape {
  xma_preview_data: Option<XmaPreviewData>,
}

#[derive(Debug, Deserialize)]
struct XmaPreviewData {
  #[serde(default, deserialize_with = "opt_string_or_number")]
  post_id: Option<String>,
  header_title: Option<String>,
  subtitle_text: Option<String>,
  title_text: Option<String>,
  preview_url: Option<String>,
  favicon_url: Option<String>,
  header_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPreviewQuery {
  post_id: String,
}

impl PostPreviewQuery {
  pub fn new(post_id: impl Into<String>) -> Result<Self, PipelineError> {
    let post_id = post_id.into().trim().to_string();
    if post_id.is_empty() {
      return Err(PipelineError::validation(
        "A postID is required to generate a preview.",
      ));
    }

    Ok(Self { post_id })
  }

  pub fn post_id(&self) -> &str {
    &self.post_id
  }
}

impl GraphQLOperation for PostPreviewQuery {
  type Output = PostPreview;

  const FRIENDLY_NAME: &'static str = "CometXMAProxyShareablePreviewQuery";
  const DOC_ID: &'static str = "28939050904374351";
  const AUTH: AuthMode = AuthMode::Cookie;

  fn variables(&self, _session: &SessionContext) -> Value {
    json!({
      "shareable_id": self.post_id,
      "scale": 3,
    })
  }

  fn extract(&self, data: Option<Value>) -> Result<PostPreview, ShapeError> {
    match decode_shape::<PreviewShape>(data, PREVIEW_NODE_PATH)? {
      PreviewShape {
        xma_preview_data: Some(preview),
      } => Ok(PostPreview {
        post_id: preview.post_id.unwrap_or_else(|| self.post_id.clone()),
        header: preview.header_title,
        subtitle: preview.subtitle_text,
        title: preview.title_text,
        preview_image: preview.preview_url,
        favicon: preview.favicon_url,
        header_image: preview.header_image_url,
      }),
      PreviewShape {
        xma_preview_data: None,
      } => Err(ShapeError::missing(PREVIEW_NODE_PATH)),
    }
  }
}
