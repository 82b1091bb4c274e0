use httpmock::{prelude::*, Mock};
use relaykit_config::{parse_config_contents, ClientConfig, ConfigFormat};
use relaykit_engine::client::RelayClient;
use serde_json::Value;

pub const GRAPHQL_PATH: &str = "/api/graphql/";
pub const TEST_USER_ID: &str = "100000000000001";

pub struct TestSuite {
  pub mock_server: MockServer,
}

impl TestSuite {
  pub async fn start() -> Self {
    Self {
      mock_server: MockServer::start_async().await,
    }
  }

  /// A client configuration pointing at the mock server, with a single `xs` session cookie.
  pub fn config(&self) -> ClientConfig {
    let contents = format!(
      r#"
endpoint: "{endpoint}"
timeout: 5s
session:
  user_id: "${{FB_USER_ID}}"
  fb_dtsg: "test-fb-dtsg"
  jazoest: "26581"
  cookies:
    - name: xs
      value: "${{FB_XS:-session-secret}}"
"#,
      endpoint = self.mock_server.url(GRAPHQL_PATH)
    );

    parse_config_contents(contents, ConfigFormat::Yaml, |key| match key {
      "FB_USER_ID" => Some(TEST_USER_ID.to_string()),
      _ => None,
    })
    .unwrap()
  }

  pub fn client(&self) -> RelayClient {
    RelayClient::from_config(&self.config()).unwrap()
  }

  /// Answers the operation named `friendly_name` with `payload`, behind the anti-hijacking guard.
  pub async fn mock_operation(&self, friendly_name: &str, payload: Value) -> Mock<'_> {
    let friendly_name = format!("fb_api_req_friendly_name={}", friendly_name);

    self
      .mock_server
      .mock_async(|when, then| {
        when
          .method(POST)
          .path(GRAPHQL_PATH)
          .header("content-type", "application/x-www-form-urlencoded")
          .body_contains(&friendly_name);
        then
          .status(200)
          .header("content-type", "text/javascript; charset=utf-8")
          .body(format!("for (;;);{}", payload));
      })
      .await
  }
}
