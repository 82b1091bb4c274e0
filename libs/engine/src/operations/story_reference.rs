use relaykit_common::http::Url;

const STORY_MARKER_SEGMENT: &str = "stories";

/// Resolves a story reference to a story id.
///
/// An absolute `http(s)` URL yields the path segment right after `/stories/`. Anything else,
/// including URLs without that segment, is used as the id once trimmed.
pub fn resolve_story_id(story_id_or_url: &str) -> String {
  let input = story_id_or_url.trim();

  match Url::parse(input) {
    Ok(url) if matches!(url.scheme(), "http" | "https") => {
      story_id_from_url(&url).unwrap_or_else(|| input.to_string())
    }
    _ => input.to_string(),
  }
}

fn story_id_from_url(url: &Url) -> Option<String> {
  let mut segments = url.path_segments()?;
  segments.by_ref().find(|s| *s == STORY_MARKER_SEGMENT)?;

  segments
    .next()
    .filter(|segment| !segment.is_empty())
    .map(ToString::to_string)
}
