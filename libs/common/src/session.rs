use std::{fmt, sync::Arc};

use reqwest::cookie::{CookieStore, Jar};

use crate::http::{HeaderValue, Url};

/// The authenticated identity used by every request of a process.
///
/// Identity and tokens are fixed at construction. The cookie jar is shared with the HTTP client,
/// which sends its cookies and stores the ones set by every response, redirects included.
#[derive(Clone)]
pub struct SessionContext {
  user_id: String,
  fb_dtsg: String,
  jazoest: String,
  cookie_jar: Arc<Jar>,
}

impl SessionContext {
  pub fn new(
    user_id: impl Into<String>,
    fb_dtsg: impl Into<String>,
    jazoest: impl Into<String>,
  ) -> Self {
    Self {
      user_id: user_id.into(),
      fb_dtsg: fb_dtsg.into(),
      jazoest: jazoest.into(),
      cookie_jar: Arc::new(Jar::default()),
    }
  }

  pub fn with_cookie_jar(mut self, cookie_jar: Arc<Jar>) -> Self {
    self.cookie_jar = cookie_jar;
    self
  }

  pub fn user_id(&self) -> &str {
    &self.user_id
  }

  pub fn fb_dtsg(&self) -> &str {
    &self.fb_dtsg
  }

  pub fn jazoest(&self) -> &str {
    &self.jazoest
  }

  pub fn cookie_jar(&self) -> &Arc<Jar> {
    &self.cookie_jar
  }

  /// Adds a cookie in `Set-Cookie` syntax, scoped to `url`.
  pub fn add_cookie(&self, cookie: &str, url: &Url) {
    self.cookie_jar.add_cookie_str(cookie, url);
  }

  /// The `Cookie` header value for a request to `url`, if any cookie matches.
  pub fn cookie_header(&self, url: &Url) -> Option<HeaderValue> {
    self.cookie_jar.cookies(url)
  }
}

impl fmt::Debug for SessionContext {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SessionContext")
      .field("user_id", &self.user_id)
      .field("fb_dtsg", &"<redacted>")
      .field("jazoest", &self.jazoest)
      .finish_non_exhaustive()
  }
}

#[cfg(feature = "test_utils")]
impl Default for SessionContext {
  fn default() -> Self {
    SessionContext::new("100000000000001", "test-fb-dtsg", "26581")
  }
}
