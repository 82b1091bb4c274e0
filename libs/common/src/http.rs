pub use bytes::Bytes;
pub use http::header;
pub use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, LOCATION};
pub use http::{HeaderMap, Method, StatusCode};
pub use url::Url;

pub type HttpHeadersMap = HeaderMap<HeaderValue>;

const BODY_PREVIEW_MAX_LEN: usize = 4096;

/// An ordered set of form fields sent as an `application/x-www-form-urlencoded` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphQLForm {
  fields: Vec<(String, String)>,
}

impl GraphQLForm {
  pub fn new() -> Self {
    Self::default()
  }

  /// Sets a field, replacing the value in place when the key is already present.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    let value = value.into();

    match self.fields.iter_mut().find(|(k, _)| *k == key) {
      Some((_, existing)) => *existing = value,
      None => self.fields.push((key, value)),
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  pub fn fields(&self) -> &[(String, String)] {
    &self.fields
  }

  pub fn len(&self) -> usize {
    self.fields.len()
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  pub fn to_urlencoded(&self) -> String {
    url::form_urlencoded::Serializer::new(String::new())
      .extend_pairs(self.fields.iter())
      .finish()
  }
}

impl From<&GraphQLForm> for Bytes {
  fn from(form: &GraphQLForm) -> Self {
    form.to_urlencoded().into()
  }
}

/// The response of the transport, before anything in it is trusted.
#[derive(Debug, Clone)]
pub struct RawResponse {
  pub status: StatusCode,
  pub headers: HttpHeadersMap,
  /// The URL that produced this response, after redirects were followed.
  pub url: Url,
  pub body: Bytes,
}

impl RawResponse {
  pub fn body_preview(&self) -> String {
    let mut body = String::from_utf8_lossy(&self.body).to_string();
    if body.len() > BODY_PREVIEW_MAX_LEN {
      let mut cut = BODY_PREVIEW_MAX_LEN;
      while !body.is_char_boundary(cut) {
        cut -= 1;
      }
      body.truncate(cut);
      body.push('…');
    }
    body
  }
}
