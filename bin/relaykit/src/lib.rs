use relaykit_config::{load_config, ClientConfig, LoggerConfig};
use relaykit_engine::{client::RelayClient, error::PipelineError};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, reload, Registry};

pub const USAGE: &str = "usage: relaykit <config-file> <command> [args...]

commands:
  preview <post-id>
  story-create <message> [font] [background]
  story-react <story-id-or-url> <emoji>
  story-reply <story-id-or-url> <message>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  Preview {
    post_id: String,
  },
  StoryCreate {
    message: String,
    font: Option<String>,
    background: Option<String>,
  },
  StoryReact {
    story: String,
    reaction: String,
  },
  StoryReply {
    story: String,
    message: String,
  },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum UsageError {
  #[error("missing command")]
  MissingCommand,
  #[error("unknown command \"{0}\"")]
  UnknownCommand(String),
  #[error("missing argument <{argument}> for \"{command}\"")]
  MissingArgument {
    command: &'static str,
    argument: &'static str,
  },
}

impl Command {
  /// Parses the arguments following the config file path.
  pub fn parse(args: &[String]) -> Result<Self, UsageError> {
    let (command, args) = args.split_first().ok_or(UsageError::MissingCommand)?;
    let arg = |index: usize, command: &'static str, argument: &'static str| {
      args
        .get(index)
        .cloned()
        .ok_or(UsageError::MissingArgument { command, argument })
    };

    match command.as_str() {
      "preview" => Ok(Command::Preview {
        post_id: arg(0, "preview", "post-id")?,
      }),
      "story-create" => Ok(Command::StoryCreate {
        message: arg(0, "story-create", "message")?,
        font: args.get(1).cloned(),
        background: args.get(2).cloned(),
      }),
      "story-react" => Ok(Command::StoryReact {
        story: arg(0, "story-react", "story-id-or-url")?,
        reaction: arg(1, "story-react", "emoji")?,
      }),
      "story-reply" => Ok(Command::StoryReply {
        story: arg(0, "story-reply", "story-id-or-url")?,
        message: arg(1, "story-reply", "message")?,
      }),
      other => Err(UsageError::UnknownCommand(other.to_string())),
    }
  }
}

/// Runs a command and returns its result as JSON.
pub async fn run_command(client: &RelayClient, command: &Command) -> Result<Value, PipelineError> {
  debug!(?command, "running command");

  match command {
    Command::Preview { post_id } => to_json(client.get_post_preview(post_id).await?),
    Command::StoryCreate {
      message,
      font,
      background,
    } => to_json(
      client
        .story_create(message, font.as_deref(), background.as_deref())
        .await?,
    ),
    Command::StoryReact { story, reaction } => to_json(client.story_react(story, reaction).await?),
    Command::StoryReply { story, message } => to_json(client.story_reply(story, message).await?),
  }
}

fn to_json(output: impl serde::Serialize) -> Result<Value, PipelineError> {
  serde_json::to_value(output).map_err(PipelineError::Build)
}

type LoggerLayer = Box<dyn tracing_subscriber::Layer<Registry> + Send + Sync>;

/// Installs the global logger with the default settings, and returns a handle to swap in the
/// configured one once the config file is loaded.
pub fn init_logger() -> anyhow::Result<reload::Handle<LoggerLayer, Registry>> {
  let defaults = LoggerConfig::default();
  let logger = relaykit_logger::logger_layer::build_logger(
    &defaults.format,
    &defaults.filter,
    defaults.print_performance_info,
  )?;
  let (logger, handle) = reload::Layer::new(logger);

  tracing::subscriber::set_global_default(tracing_subscriber::registry().with(logger))?;

  Ok(handle)
}

pub fn load_client(
  config_file_path: &str,
  logger_handle: &reload::Handle<LoggerLayer, Registry>,
) -> anyhow::Result<RelayClient> {
  let config: ClientConfig = load_config(config_file_path, |key| std::env::var(key).ok())?;
  info!("Configuration loaded and parsed");

  if let Some(logger_config) = &config.logger {
    let logger = relaykit_logger::logger_layer::build_logger(
      &logger_config.format,
      &logger_config.filter,
      logger_config.print_performance_info,
    )?;
    logger_handle.reload(logger)?;
  }

  Ok(RelayClient::from_config(&config)?)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
  }

  #[test]
  fn commands_are_parsed() {
    assert_eq!(
      Command::parse(&args(&["preview", "123"])),
      Ok(Command::Preview {
        post_id: "123".to_string()
      })
    );
    assert_eq!(
      Command::parse(&args(&["story-create", "Hello", "fancy"])),
      Ok(Command::StoryCreate {
        message: "Hello".to_string(),
        font: Some("fancy".to_string()),
        background: None,
      })
    );
    assert_eq!(
      Command::parse(&args(&["story-react", "S1", "👍"])),
      Ok(Command::StoryReact {
        story: "S1".to_string(),
        reaction: "👍".to_string(),
      })
    );
  }

  #[test]
  fn usage_errors() {
    assert_eq!(Command::parse(&[]), Err(UsageError::MissingCommand));
    assert_eq!(
      Command::parse(&args(&["story-reply", "S1"])),
      Err(UsageError::MissingArgument {
        command: "story-reply",
        argument: "message"
      })
    );
    assert_eq!(
      Command::parse(&args(&["publish"])),
      Err(UsageError::UnknownCommand("publish".to_string()))
    );
  }
}
