use std::{fmt::Debug, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use relaykit_common::{
  http::{GraphQLForm, HeaderValue, RawResponse, StatusCode, Url, CONTENT_TYPE},
  session::SessionContext,
};
use relaykit_config::ClientConfig;
use relaykit_http_tracing::{traced_reqwest, TracedHttpClient};
use reqwest::cookie::Jar;
use tracing::{debug, debug_span, Instrument};

pub const DEFAULT_USER_AGENT: &str = concat!("relaykit/", env!("CARGO_PKG_VERSION"));

pub type TransportFuture<'a> = BoxFuture<'a, Result<RawResponse, TransportError>>;

/// Sends a form to the GraphQL endpoint on behalf of a session.
pub trait Transport: Debug + Send + Sync + 'static {
  fn post<'a>(
    &'a self,
    endpoint: &'a Url,
    form: &'a GraphQLForm,
    session: &'a SessionContext,
  ) -> TransportFuture<'a>;
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
  #[error("failed to init http client: {0}")]
  FetcherError(reqwest::Error),
  #[error("network error: {0}")]
  NetworkError(reqwest_middleware::Error),
  #[error("failed to read response body: {0}")]
  BodyError(reqwest::Error),
  #[error("unexpected HTTP status {status}: {body}")]
  UnexpectedHTTPStatusError { status: StatusCode, body: String },
  #[error("malformed response payload: {0}")]
  MalformedPayload(serde_json::Error),
}

/// HTTP transport bound to one cookie jar.
///
/// The jar is handed to reqwest as its cookie store, so cookies are sent with every request and
/// `Set-Cookie` headers are stored for every response, redirect hops included.
#[derive(Debug)]
pub struct HttpTransport {
  fetcher: TracedHttpClient,
}

impl HttpTransport {
  pub fn new(
    timeout: Duration,
    user_agent: Option<&str>,
    cookie_jar: Arc<Jar>,
  ) -> Result<Self, TransportError> {
    let raw_client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
      .cookie_provider(cookie_jar)
      .build()
      .map_err(TransportError::FetcherError)?;

    Ok(Self {
      fetcher: traced_reqwest(raw_client),
    })
  }

  pub fn from_config(
    config: &ClientConfig,
    session: &SessionContext,
  ) -> Result<Self, TransportError> {
    Self::new(
      config.timeout,
      config.user_agent.as_deref(),
      session.cookie_jar().clone(),
    )
  }
}

impl Transport for HttpTransport {
  fn post<'a>(
    &'a self,
    endpoint: &'a Url,
    form: &'a GraphQLForm,
    session: &'a SessionContext,
  ) -> TransportFuture<'a> {
    let span = debug_span!(
      "HttpTransport::post",
      endpoint = %endpoint.path(),
      user_id = session.user_id()
    );

    Box::pin(
      async move {
        debug!(fields = form.len(), "sending form to the GraphQL endpoint");

        let response = self
          .fetcher
          .post(endpoint.clone())
          .header(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
          )
          .body(form.to_urlencoded())
          .send()
          .await
          .map_err(TransportError::NetworkError)?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();

        let body = response
          .bytes()
          .await
          .map_err(TransportError::BodyError)?;

        debug!(%status, bytes = body.len(), "received response");

        Ok(RawResponse {
          status,
          headers,
          url,
          body,
        })
      }
      .instrument(span),
    )
  }
}
