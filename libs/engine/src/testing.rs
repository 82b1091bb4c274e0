use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Mutex,
};

use relaykit_common::{
  http::{Bytes, GraphQLForm, HttpHeadersMap, RawResponse, StatusCode, Url},
  session::SessionContext,
};

use crate::transport::{Transport, TransportFuture};

/// Answers every request with the same response, and remembers what it was sent.
#[derive(Debug)]
pub struct StubTransport {
  status: StatusCode,
  body: Bytes,
  calls: AtomicUsize,
  last_form: Mutex<Option<GraphQLForm>>,
}

impl StubTransport {
  pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
    Self {
      status,
      body: body.into(),
      calls: AtomicUsize::new(0),
      last_form: Mutex::new(None),
    }
  }

  pub fn ok(body: &'static str) -> Self {
    Self::new(StatusCode::OK, body)
  }

  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  pub fn last_form(&self) -> Option<GraphQLForm> {
    self.last_form.lock().ok().and_then(|form| form.clone())
  }
}

impl Transport for StubTransport {
  fn post<'a>(
    &'a self,
    endpoint: &'a Url,
    form: &'a GraphQLForm,
    _session: &'a SessionContext,
  ) -> TransportFuture<'a> {
    Box::pin(async move {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if let Ok(mut last_form) = self.last_form.lock() {
        *last_form = Some(form.clone());
      }

      Ok(RawResponse {
        status: self.status,
        headers: HttpHeadersMap::new(),
        url: endpoint.clone(),
        body: self.body.clone(),
      })
    })
  }
}
