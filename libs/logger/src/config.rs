use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, JsonSchema, PartialEq, Eq)]
/// Output format of the log lines written to stdout.
pub enum LoggerConfigFormat {
  /// Minimal, single-line logs with the message and its fields.
  ///
  /// Good default for terminals: short lines, little overhead.
  #[serde(rename = "compact")]
  #[schemars(title = "compact")]
  Compact,

  /// Multi-line, indented output including source locations and span context.
  ///
  /// Meant for development: the most readable format, and the most verbose one.
  #[serde(rename = "pretty")]
  #[schemars(title = "pretty")]
  Pretty,

  /// One JSON object per line, for log collectors and anything that parses logs.
  #[serde(rename = "json")]
  #[schemars(title = "json")]
  Json,
}

impl Default for LoggerConfigFormat {
  // In development, we wish to see some more details and code locations.
  #[cfg(debug_assertions)]
  fn default() -> Self {
    LoggerConfigFormat::Pretty
  }

  #[cfg(not(debug_assertions))]
  fn default() -> Self {
    if atty::is(atty::Stream::Stdout) {
      LoggerConfigFormat::Compact
    } else {
      LoggerConfigFormat::Json
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn formats_use_lowercase_names() {
    let format: LoggerConfigFormat = serde_json::from_str("\"json\"").unwrap();
    assert_eq!(format, LoggerConfigFormat::Json);
    assert_eq!(
      serde_json::to_string(&LoggerConfigFormat::Compact).unwrap(),
      "\"compact\""
    );
    assert!(serde_json::from_str::<LoggerConfigFormat>("\"Json\"").is_err());
  }
}
