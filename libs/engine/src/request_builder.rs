use relaykit_common::{http::GraphQLForm, session::SessionContext};
use serde_json::Value;

pub const RELAY_CALLER_CLASS: &str = "RelayModern";

/// How a request authenticates, on top of the session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
  /// Cookies only, enough for read queries.
  Cookie,
  /// Mutations also carry the user id and the anti-forgery tokens as form fields.
  Mutation,
}

/// One invocation of a pre-registered GraphQL operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
  pub friendly_name: &'static str,
  pub doc_id: &'static str,
  pub variables: Value,
  pub auth: AuthMode,
}

/// Builds the form posted to the GraphQL endpoint.
///
/// `variables` is encoded to a JSON string exactly once, the result is only ever urlencoded
/// afterwards.
pub fn build_form(
  descriptor: &OperationDescriptor,
  session: &SessionContext,
) -> Result<GraphQLForm, serde_json::Error> {
  let mut form = GraphQLForm::new();

  if descriptor.auth == AuthMode::Mutation {
    form.insert("av", session.user_id());
    form.insert("__user", session.user_id());
    form.insert("__a", "1");
    form.insert("fb_dtsg", session.fb_dtsg());
    form.insert("jazoest", session.jazoest());
  }

  form.insert("fb_api_caller_class", RELAY_CALLER_CLASS);
  form.insert("fb_api_req_friendly_name", descriptor.friendly_name);
  form.insert("variables", serde_json::to_string(&descriptor.variables)?);
  form.insert("doc_id", descriptor.doc_id);

  Ok(form)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn descriptor(auth: AuthMode) -> OperationDescriptor {
    OperationDescriptor {
      friendly_name: "CometXMAProxyShareablePreviewQuery",
      doc_id: "28939050904374351",
      variables: json!({ "shareable_id": "123", "scale": 3 }),
      auth,
    }
  }

  #[test]
  fn query_form_has_calling_convention_fields_only() {
    let form = build_form(&descriptor(AuthMode::Cookie), &SessionContext::default()).unwrap();

    assert_eq!(form.get("fb_api_caller_class"), Some("RelayModern"));
    assert_eq!(
      form.get("fb_api_req_friendly_name"),
      Some("CometXMAProxyShareablePreviewQuery")
    );
    assert_eq!(form.get("doc_id"), Some("28939050904374351"));
    for key in ["av", "__user", "__a", "fb_dtsg", "jazoest"] {
      assert!(!form.contains_key(key), "unexpected field {}", key);
    }
  }

  #[test]
  fn mutation_form_embeds_the_session_identity() {
    let session = SessionContext::new("4242", "dtsg-token", "25990");
    let form = build_form(&descriptor(AuthMode::Mutation), &session).unwrap();

    assert_eq!(form.get("av"), Some("4242"));
    assert_eq!(form.get("__user"), Some("4242"));
    assert_eq!(form.get("__a"), Some("1"));
    assert_eq!(form.get("fb_dtsg"), Some("dtsg-token"));
    assert_eq!(form.get("jazoest"), Some("25990"));
  }

  #[test]
  fn variables_are_encoded_once() {
    let form = build_form(&descriptor(AuthMode::Cookie), &SessionContext::default()).unwrap();
    let variables = form.get("variables").unwrap();

    let decoded: Value = serde_json::from_str(variables).unwrap();
    assert!(decoded.is_object(), "variables were encoded twice: {}", variables);
    assert_eq!(decoded, json!({ "shareable_id": "123", "scale": 3 }));
  }

  #[test]
  fn building_is_deterministic() {
    let session = SessionContext::default();
    let first = build_form(&descriptor(AuthMode::Mutation), &session).unwrap();
    let second = build_form(&descriptor(AuthMode::Mutation), &session).unwrap();

    assert_eq!(first, second);
  }
}
