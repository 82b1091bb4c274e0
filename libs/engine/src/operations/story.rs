use std::{
  fmt::{Display, Formatter},
  str::FromStr,
  time::{SystemTime, UNIX_EPOCH},
};

use rand::Rng;
use relaykit_common::session::SessionContext;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{
  decode_shape, opt_string_or_number, story_reference::resolve_story_id, GraphQLOperation,
};
use crate::{
  error::{PipelineError, ShapeError},
  request_builder::AuthMode,
};

const CREATED_STORY_PATH: &str =
  "data.story_create.viewer.actor.story_bucket.nodes[0].first_story_to_show.id";
const STORY_REPLY_PATH: &str = "data.direct_message_reply";

const CREATE_ATTRIBUTION: &str = "StoriesCreateRoot.react,comet.stories.create";
const REPLY_ATTRIBUTION: &str =
  "StoriesCometSuspenseRoot.react,comet.stories.viewer,via_cold_start";

fn client_mutation_id() -> String {
  rand::thread_rng().gen_range(1..=10).to_string()
}

fn normalized_name(name: Option<&str>) -> Option<String> {
  name
    .map(|name| name.trim().to_lowercase())
    .filter(|name| !name.is_empty())
}

/// Fonts of text stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoryFont {
  Headline,
  #[default]
  Classic,
  Casual,
  Fancy,
}

impl StoryFont {
  pub const ALL: [StoryFont; 4] = [
    StoryFont::Headline,
    StoryFont::Classic,
    StoryFont::Casual,
    StoryFont::Fancy,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      StoryFont::Headline => "headline",
      StoryFont::Classic => "classic",
      StoryFont::Casual => "casual",
      StoryFont::Fancy => "fancy",
    }
  }

  pub fn id(&self) -> &'static str {
    match self {
      StoryFont::Headline => "1919119914775364",
      // The platform renders casual text with the classic font.
      StoryFont::Classic | StoryFont::Casual => "516266749248495",
      StoryFont::Fancy => "1790435664339626",
    }
  }

  /// Case-insensitive lookup, unknown or missing names give the default font.
  pub fn from_name(name: Option<&str>) -> Self {
    let Some(name) = normalized_name(name) else {
      return StoryFont::default();
    };

    StoryFont::ALL
      .into_iter()
      .find(|font| font.name() == name)
      .unwrap_or_else(|| {
        debug!(font = %name, "unknown story font, using the default one");
        StoryFont::default()
      })
  }
}

/// Background presets of text stories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoryBackground {
  Orange,
  #[default]
  Blue,
  Green,
  Modern,
}

impl StoryBackground {
  pub const ALL: [StoryBackground; 4] = [
    StoryBackground::Orange,
    StoryBackground::Blue,
    StoryBackground::Green,
    StoryBackground::Modern,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      StoryBackground::Orange => "orange",
      StoryBackground::Blue => "blue",
      StoryBackground::Green => "green",
      StoryBackground::Modern => "modern",
    }
  }

  pub fn id(&self) -> &'static str {
    match self {
      StoryBackground::Orange => "2163607613910521",
      StoryBackground::Blue => "401372137331149",
      StoryBackground::Green => "367314917184744",
      StoryBackground::Modern => "554617635055752",
    }
  }

  /// Case-insensitive lookup, unknown or missing names give the default background.
  pub fn from_name(name: Option<&str>) -> Self {
    let Some(name) = normalized_name(name) else {
      return StoryBackground::default();
    };

    StoryBackground::ALL
      .into_iter()
      .find(|background| background.name() == name)
      .unwrap_or_else(|| {
        debug!(background = %name, "unknown story background, using the default one");
        StoryBackground::default()
      })
  }
}

/// The emoji reactions a story accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reaction {
  Love,
  Like,
  Care,
  Haha,
  Angry,
  Sad,
  Wow,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid reaction. Please use one of: {}", Reaction::allowed_list())]
pub struct InvalidReaction(pub String);

impl Reaction {
  pub const ALL: [Reaction; 7] = [
    Reaction::Love,
    Reaction::Like,
    Reaction::Care,
    Reaction::Haha,
    Reaction::Angry,
    Reaction::Sad,
    Reaction::Wow,
  ];

  pub fn as_emoji(&self) -> &'static str {
    match self {
      Reaction::Love => "\u{2764}\u{FE0F}",
      Reaction::Like => "\u{1F44D}",
      Reaction::Care => "\u{1F917}",
      Reaction::Haha => "\u{1F606}",
      Reaction::Angry => "\u{1F621}",
      Reaction::Sad => "\u{1F622}",
      Reaction::Wow => "\u{1F62E}",
    }
  }

  fn allowed_list() -> String {
    Reaction::ALL
      .iter()
      .map(Reaction::as_emoji)
      .collect::<Vec<_>>()
      .join(" ")
  }
}

// Variation selectors only pick text or emoji presentation, `❤` and `❤️` are the same reaction.
fn without_variation_selectors(value: &str) -> String {
  value
    .chars()
    .filter(|c| !matches!(c, '\u{FE0E}' | '\u{FE0F}'))
    .collect()
}

impl FromStr for Reaction {
  type Err = InvalidReaction;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let normalized = without_variation_selectors(value.trim());

    Reaction::ALL
      .into_iter()
      .find(|reaction| without_variation_selectors(reaction.as_emoji()) == normalized)
      .ok_or_else(|| InvalidReaction(value.to_string()))
  }
}

impl Display for Reaction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_emoji())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedStory {
  pub success: bool,
  #[serde(rename = "storyID")]
  pub story_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryReplyReceipt {
  pub success: bool,
  pub result: Value,
}

#[derive(Debug, Deserialize)]
struct StoryCreateShape {
  story_create: Option<StoryCreatePayload>,
}

#[derive(Debug, Deserialize)]
struct StoryCreatePayload {
  viewer: Option<StoryViewer>,
}

#[derive(Debug, Deserialize)]
struct StoryViewer {
  actor: Option<StoryActor>,
}

#[derive(Debug, Deserialize)]
struct StoryActor {
  story_bucket: Option<StoryBucket>,
}

#[derive(Debug, Deserialize)]
struct StoryBucket {
  #[serde(default)]
  nodes: Option<Vec<StoryBucketNode>>,
}

#[derive(Debug, Deserialize)]
struct StoryBucketNode {
  first_story_to_show: Option<StoryCard>,
}

#[derive(Debug, Deserialize)]
struct StoryCard {
  #[serde(default, deserialize_with = "opt_string_or_number")]
  id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StoryReplyShape {
  direct_message_reply: Option<Value>,
}

/// Publishes a text story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryCreate {
  message: String,
  font: StoryFont,
  background: StoryBackground,
  composer_session_id: String,
  client_mutation_id: String,
}

impl StoryCreate {
  pub fn new(
    message: impl Into<String>,
    font: Option<&str>,
    background: Option<&str>,
  ) -> Result<Self, PipelineError> {
    let message = message.into();
    if message.trim().is_empty() {
      return Err(PipelineError::validation(
        "Message is required to create a story.",
      ));
    }

    let now_millis = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map(|elapsed| elapsed.as_millis())
      .unwrap_or_default();

    Ok(Self {
      message,
      font: StoryFont::from_name(font),
      background: StoryBackground::from_name(background),
      composer_session_id: format!("createStoriesText-{}", now_millis),
      client_mutation_id: client_mutation_id(),
    })
  }

  pub fn font(&self) -> StoryFont {
    self.font
  }

  pub fn background(&self) -> StoryBackground {
    self.background
  }
}

impl GraphQLOperation for StoryCreate {
  type Output = CreatedStory;

  const FRIENDLY_NAME: &'static str = "StoriesCreateMutation";
  const DOC_ID: &'static str = "24226878183562473";
  const AUTH: AuthMode = AuthMode::Mutation;

  fn variables(&self, session: &SessionContext) -> Value {
    json!({
      "input": {
        "audiences": [{ "stories": { "self": { "target_id": session.user_id() } } }],
        "audiences_is_complete": true,
        "logging": { "composer_session_id": self.composer_session_id },
        "navigation_data": { "attribution_id_v2": CREATE_ATTRIBUTION },
        "source": "WWW",
        "message": { "ranges": [], "text": self.message },
        "text_format_metadata": { "inspirations_custom_font_id": self.font.id() },
        "text_format_preset_id": self.background.id(),
        "tracking": [null],
        "actor_id": session.user_id(),
        "client_mutation_id": self.client_mutation_id,
      }
    })
  }

  fn extract(&self, data: Option<Value>) -> Result<CreatedStory, ShapeError> {
    let shape = decode_shape::<StoryCreateShape>(data, CREATED_STORY_PATH)?;

    if let StoryCreateShape {
      story_create:
        Some(StoryCreatePayload {
          viewer:
            Some(StoryViewer {
              actor:
                Some(StoryActor {
                  story_bucket: Some(StoryBucket { nodes: Some(nodes) }),
                }),
            }),
        }),
    } = shape
    {
      if let [StoryBucketNode {
        first_story_to_show: Some(StoryCard { id: Some(id) }),
      }, ..] = nodes.as_slice()
      {
        if !id.is_empty() {
          return Ok(CreatedStory {
            success: true,
            story_id: id.clone(),
          });
        }
      }
    }

    Err(ShapeError::missing(CREATED_STORY_PATH))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryReplyKind {
  Text,
  Reaction(Reaction),
}

/// Sends a text reply or an emoji reaction to a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryReply {
  story_id: String,
  message: String,
  kind: StoryReplyKind,
  client_mutation_id: String,
}

impl StoryReply {
  fn resolve_target(story_id_or_url: &str) -> Result<String, PipelineError> {
    if story_id_or_url.trim().is_empty() {
      return Err(PipelineError::validation("Story ID or URL is required."));
    }

    Ok(resolve_story_id(story_id_or_url))
  }

  pub fn text(story_id_or_url: &str, message: impl Into<String>) -> Result<Self, PipelineError> {
    let story_id = Self::resolve_target(story_id_or_url)?;
    let message = message.into();
    if message.trim().is_empty() {
      return Err(PipelineError::validation("A message or reaction is required."));
    }

    Ok(Self {
      story_id,
      message,
      kind: StoryReplyKind::Text,
      client_mutation_id: client_mutation_id(),
    })
  }

  pub fn reaction(story_id_or_url: &str, reaction: &str) -> Result<Self, PipelineError> {
    let story_id = Self::resolve_target(story_id_or_url)?;
    if reaction.trim().is_empty() {
      return Err(PipelineError::validation("A message or reaction is required."));
    }

    let reaction = reaction
      .parse::<Reaction>()
      .map_err(|e| PipelineError::validation(e.to_string()))?;

    Ok(Self {
      story_id,
      message: reaction.as_emoji().to_string(),
      kind: StoryReplyKind::Reaction(reaction),
      client_mutation_id: client_mutation_id(),
    })
  }

  pub fn story_id(&self) -> &str {
    &self.story_id
  }

  pub fn kind(&self) -> StoryReplyKind {
    self.kind
  }
}

impl GraphQLOperation for StoryReply {
  type Output = StoryReplyReceipt;

  const FRIENDLY_NAME: &'static str = "useStoriesSendReplyMutation";
  const DOC_ID: &'static str = "9697491553691692";
  const AUTH: AuthMode = AuthMode::Mutation;

  fn variables(&self, session: &SessionContext) -> Value {
    let story_reply_type = match self.kind {
      StoryReplyKind::Text => "TEXT",
      StoryReplyKind::Reaction(_) => "LIGHT_WEIGHT",
    };

    let mut input = json!({
      "attribution_id_v2": REPLY_ATTRIBUTION,
      "message": self.message,
      "story_id": self.story_id,
      "story_reply_type": story_reply_type,
      "actor_id": session.user_id(),
      "client_mutation_id": self.client_mutation_id,
    });

    if let (StoryReplyKind::Reaction(reaction), Value::Object(fields)) = (self.kind, &mut input) {
      fields.insert(
        "lightweight_reaction_actions".to_string(),
        json!({ "offsets": [0], "reaction": reaction.as_emoji() }),
      );
    }

    json!({ "input": input })
  }

  fn extract(&self, data: Option<Value>) -> Result<StoryReplyReceipt, ShapeError> {
    match decode_shape::<StoryReplyShape>(data, STORY_REPLY_PATH)? {
      StoryReplyShape {
        direct_message_reply: Some(reply),
      } if !reply.is_null() => Ok(StoryReplyReceipt {
        success: true,
        result: reply,
      }),
      _ => Err(ShapeError::missing(STORY_REPLY_PATH)),
    }
  }
}
