pub mod interpolate;

use interpolate::interpolate;
use relaykit_common::{http::Url, session::SessionContext};
use relaykit_logger::config::LoggerConfigFormat;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::{fs::read_to_string, path::Path, time::Duration};
use tracing::warn;

/// Top-level configuration of the relaykit client.
///
/// JSON and YAML files are supported, the format is picked from the file extension.
///
/// ### Environment variables
///
/// Values can be read from the environment before the file is parsed, which keeps session
/// tokens out of the file itself:
///
/// - `${VAR_NAME}` inserts the value of `VAR_NAME`, with a warning when it is not set.
/// - `${VAR_NAME:-default_value}` uses `default_value` when `VAR_NAME` is unset or empty.
/// - `${VAR_NAME:?message}` fails loading when `VAR_NAME` is unset or empty.
/// - `$$` produces a literal dollar sign.
///
/// ```yaml
/// session:
///   user_id: "${FB_USER_ID:?}"
///   fb_dtsg: "${FB_DTSG:?}"
///   jazoest: "${FB_JAZOEST:?}"
///   cookies:
///     - name: c_user
///       value: "${FB_USER_ID}"
///     - name: xs
///       value: "${FB_XS:?}"
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ClientConfig {
  /// The GraphQL endpoint every operation is posted to.
  #[serde(default = "default_endpoint")]
  pub endpoint: Url,
  /// Timeout applied to every request, in humantime format (`30s`, `1m 30s`).
  #[serde(
    deserialize_with = "humantime_serde::deserialize",
    serialize_with = "humantime_serde::serialize",
    default = "default_timeout"
  )]
  #[schemars(with = "String")]
  pub timeout: Duration,
  /// Overrides the `User-Agent` header sent with every request.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  /// Logger configuration.
  pub logger: Option<LoggerConfig>,
  /// The authenticated session used for all requests.
  pub session: SessionConfig,
}

pub fn default_endpoint() -> Url {
  // @expected: the endpoint is a constant, valid URL
  Url::parse("https://www.facebook.com/api/graphql/").unwrap()
}

fn default_timeout() -> Duration {
  Duration::from_secs(30)
}

#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct LoggerConfig {
  /// Environment filter directives, for example `info` or `relaykit_engine=debug,info`.
  ///
  /// See [tracing_subscriber::EnvFilter](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html) for the syntax.
  #[serde(default = "default_log_filter")]
  pub filter: String,
  /// Log format. `pretty` in debug builds, otherwise `compact` on a TTY and `json` elsewhere.
  #[serde(default)]
  pub format: LoggerConfigFormat,
  /// Logs every closing span with its duration. Look for `close` lines in the output.
  #[serde(default)]
  pub print_performance_info: bool,
}

impl Default for LoggerConfig {
  fn default() -> Self {
    Self {
      filter: default_log_filter(),
      format: LoggerConfigFormat::default(),
      print_performance_info: false,
    }
  }
}

fn default_log_filter() -> String {
  "info".to_string()
}

/// An already authenticated session. Logging in is not handled by relaykit: copy these values
/// from a logged-in browser session.
#[derive(Deserialize, Serialize, Clone, JsonSchema)]
pub struct SessionConfig {
  /// The id of the logged-in account (the `c_user` cookie).
  pub user_id: String,
  /// The anti-forgery token of the session.
  pub fb_dtsg: String,
  /// The checksum token sent next to `fb_dtsg`.
  pub jazoest: String,
  /// Cookies of the session.
  #[serde(default)]
  pub cookies: Vec<CookieConfig>,
}

impl std::fmt::Debug for SessionConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionConfig")
      .field("user_id", &self.user_id)
      .field("cookies", &self.cookies.len())
      .finish_non_exhaustive()
  }
}

#[derive(Deserialize, Serialize, Clone, JsonSchema)]
pub struct CookieConfig {
  pub name: String,
  pub value: String,
  /// Domain the cookie is sent to. Defaults to the domain of the endpoint.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub domain: Option<String>,
}

impl SessionConfig {
  /// Creates the session context, with all configured cookies scoped to `endpoint`.
  pub fn to_session_context(&self, endpoint: &Url) -> SessionContext {
    let session = SessionContext::new(&self.user_id, &self.fb_dtsg, &self.jazoest);

    for cookie in &self.cookies {
      let cookie_str = match (&cookie.domain, endpoint.domain()) {
        (Some(domain), _) => format!("{}={}; Domain={}; Path=/", cookie.name, cookie.value, domain),
        (None, Some(domain)) => format!(
          "{}={}; Domain={}; Path=/",
          cookie.name,
          cookie.value,
          registrable_domain(domain)
        ),
        (None, None) => format!("{}={}; Path=/", cookie.name, cookie.value),
      };
      session.add_cookie(&cookie_str, endpoint);
    }

    session
  }
}

// `www.facebook.com` -> `facebook.com`, so cookies also reach the other subdomains.
fn registrable_domain(host: &str) -> &str {
  let mut dots = host.rmatch_indices('.');
  match (dots.next(), dots.next()) {
    (Some(_), Some((second_last, _))) => &host[second_last + 1..],
    _ => host,
  }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
  #[error("failed to read config file \"{path}\": {source}")]
  ReadFailed {
    path: String,
    source: std::io::Error,
  },
  #[error("unsupported config file extension: {0:?}")]
  UnsupportedExtension(Option<String>),
  #[error("failed to interpolate config file: {}", .0.join(", "))]
  Interpolation(Vec<String>),
  #[error("failed to parse JSON config file: {0}")]
  InvalidJson(#[from] serde_json::Error),
  #[error("failed to parse YAML config file: {0}")]
  InvalidYaml(#[from] serde_yaml::Error),
}

pub fn load_config(
  file_path: &str,
  get_env_value: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, ConfigError> {
  let path = Path::new(file_path);
  let format = ConfigFormat::from_path(path)?;

  let raw_contents = read_to_string(file_path).map_err(|source| ConfigError::ReadFailed {
    path: file_path.to_string(),
    source,
  })?;

  parse_config_contents(raw_contents, format, get_env_value)
}

pub fn parse_config_contents(
  contents: String,
  format: ConfigFormat,
  get_env_value: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, ConfigError> {
  let (config_string, warnings) =
    interpolate(&contents, get_env_value).map_err(ConfigError::Interpolation)?;

  for warning in warnings {
    warn!("{}", warning);
  }

  match format {
    ConfigFormat::Json => Ok(serde_json::from_str::<ClientConfig>(&config_string)?),
    ConfigFormat::Yaml => Ok(serde_yaml::from_str::<ClientConfig>(&config_string)?),
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
  Json,
  Yaml,
}

impl ConfigFormat {
  pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
    let extension = path.extension().and_then(|ext| ext.to_str());

    match extension {
      Some("json") => Ok(ConfigFormat::Json),
      Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
      other => Err(ConfigError::UnsupportedExtension(
        other.map(ToString::to_string),
      )),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  static YAML_CONFIG: &str = r#"
session:
  user_id: "${FB_USER_ID}"
  fb_dtsg: "${FB_DTSG:?}"
  jazoest: "26581"
  cookies:
    - name: c_user
      value: "${FB_USER_ID}"
    - name: xs
      value: secret
timeout: 5s
logger:
  format: json
"#;

  fn env(vars: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
    move |key: &str| vars.get(key).map(|v| v.to_string())
  }

  #[test]
  fn yaml_config_is_interpolated_and_parsed() {
    let config = parse_config_contents(
      YAML_CONFIG.to_string(),
      ConfigFormat::Yaml,
      env(HashMap::from([("FB_USER_ID", "1000"), ("FB_DTSG", "dtsg")])),
    )
    .unwrap();

    assert_eq!(config.session.user_id, "1000");
    assert_eq!(config.session.fb_dtsg, "dtsg");
    assert_eq!(config.session.cookies.len(), 2);
    assert_eq!(config.timeout, Duration::from_secs(5));
    assert_eq!(config.endpoint, default_endpoint());
    assert_eq!(config.logger.unwrap().format, LoggerConfigFormat::Json);
  }

  #[test]
  fn missing_required_variable_fails() {
    let result = parse_config_contents(
      YAML_CONFIG.to_string(),
      ConfigFormat::Yaml,
      env(HashMap::from([("FB_USER_ID", "1000")])),
    );

    assert!(matches!(result, Err(ConfigError::Interpolation(errors)) if errors.len() == 1));
  }

  #[test]
  fn json_config_uses_defaults() {
    let config = parse_config_contents(
      r#"{ "session": { "user_id": "1", "fb_dtsg": "d", "jazoest": "2" } }"#.to_string(),
      ConfigFormat::Json,
      env(HashMap::new()),
    )
    .unwrap();

    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(config.logger.is_none());
    assert!(config.user_agent.is_none());
  }

  #[test]
  fn format_is_picked_from_extension() {
    assert_eq!(
      ConfigFormat::from_path(Path::new("a/b.yml")).unwrap(),
      ConfigFormat::Yaml
    );
    assert_eq!(
      ConfigFormat::from_path(Path::new("config.json")).unwrap(),
      ConfigFormat::Json
    );
    assert!(ConfigFormat::from_path(Path::new("config.toml")).is_err());
    assert!(ConfigFormat::from_path(Path::new("config")).is_err());
  }

  #[test]
  fn session_cookies_reach_every_subdomain() {
    let endpoint = default_endpoint();
    let session = SessionConfig {
      user_id: "1".to_string(),
      fb_dtsg: "d".to_string(),
      jazoest: "2".to_string(),
      cookies: vec![CookieConfig {
        name: "c_user".to_string(),
        value: "1".to_string(),
        domain: None,
      }],
    }
    .to_session_context(&endpoint);

    let other_subdomain = Url::parse("https://m.facebook.com/").unwrap();
    assert!(session.cookie_header(&endpoint).is_some());
    assert!(session.cookie_header(&other_subdomain).is_some());
    assert_eq!(session.user_id(), "1");
  }

  #[test]
  fn registrable_domain_keeps_short_hosts() {
    assert_eq!(registrable_domain("www.facebook.com"), "facebook.com");
    assert_eq!(registrable_domain("facebook.com"), "facebook.com");
    assert_eq!(registrable_domain("localhost"), "localhost");
  }
}
