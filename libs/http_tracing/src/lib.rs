use reqwest::{Request, Response, StatusCode, Url};
use reqwest_middleware::ClientBuilder;
use reqwest_middleware::ClientWithMiddleware;
use reqwest_middleware::{Middleware, Next, Result};
use tracing::{field, info_span, warn, Instrument, Span};

/// Wraps every outbound request in an `http_request` span.
#[derive(Debug, Default)]
pub struct TracingReqwestMiddleware;

#[inline]
fn get_span_status(request_status: StatusCode) -> Option<&'static str> {
  match request_status.as_u16() {
    // 1xx, 2xx and 3xx responses leave the status unset.
    100..=399 => None,
    // Any other code is an error on the client side.
    _ => Some("ERROR"),
  }
}

// Query strings may carry tokens, only the origin and path are recorded.
fn display_url(url: &Url) -> String {
  format!("{}{}", url.origin().ascii_serialization(), url.path())
}

impl TracingReqwestMiddleware {
  #[inline]
  pub fn request_span(&self, req: &Request) -> Span {
    let url = req.url();

    info_span!(
      "http_request",
      otel.name = %format!("{} {}", req.method(), url.path()),
      otel.kind = "client",
      otel.status_code = field::Empty,
      http.method = %req.method(),
      http.url = %display_url(url),
      http.host = url.host_str().unwrap_or(""),
      http.status_code = field::Empty,
      error.message = field::Empty,
    )
  }

  #[inline]
  pub fn record_response(&self, span: &Span, res: &Result<Response>) {
    match res {
      Ok(response) => {
        span.record("http.status_code", response.status().as_u16());

        if let Some(span_status) = get_span_status(response.status()) {
          span.record("otel.status_code", span_status);
        }
      }
      Err(e) => {
        span.record("otel.status_code", "ERROR");
        span.record("error.message", field::display(e));

        if let reqwest_middleware::Error::Reqwest(e) = e {
          if let Some(status) = e.status() {
            span.record("http.status_code", status.as_u16());
          }
        }

        warn!(error = ?e, "outbound request failed");
      }
    }
  }
}

#[async_trait::async_trait]
impl Middleware for TracingReqwestMiddleware {
  async fn handle(
    &self,
    req: Request,
    extensions: &mut http::Extensions,
    next: Next<'_>,
  ) -> Result<Response> {
    let span = self.request_span(&req);

    let response = next
      .run(req, extensions)
      .instrument(span.clone())
      .await;

    self.record_response(&span, &response);

    response
  }
}

pub type TracedHttpClient = ClientWithMiddleware;

pub fn traced_reqwest(raw_client: reqwest::Client) -> TracedHttpClient {
  ClientBuilder::new(raw_client)
    .with(TracingReqwestMiddleware)
    .build()
}
