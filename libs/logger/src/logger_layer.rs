use crate::config::LoggerConfigFormat;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;
use tracing_subscriber::{
  fmt::{self, format::FmtSpan, time::UtcTime},
  Layer,
};

/// Builds the stdout layer for the given format.
///
/// `filter` uses the `EnvFilter` directive syntax (`info`, `relaykit_engine=debug`, ...). With
/// `print_performance_info`, closing spans are logged along with their busy/idle time, which is
/// how the duration of every pipeline stage becomes visible.
pub fn build_logger(
  format: &LoggerConfigFormat,
  filter: &str,
  print_performance_info: bool,
) -> Result<Box<dyn Layer<Registry> + Send + Sync>, tracing_subscriber::filter::ParseError> {
  let filter = EnvFilter::try_new(filter)?;
  let span_events = if print_performance_info {
    FmtSpan::CLOSE
  } else {
    FmtSpan::NONE
  };
  let layer = fmt::Layer::<Registry>::default()
    .with_timer(UtcTime::rfc_3339())
    .with_span_events(span_events);

  Ok(match format {
    LoggerConfigFormat::Json => layer.json().with_filter(filter).boxed(),
    LoggerConfigFormat::Pretty => layer.pretty().with_filter(filter).boxed(),
    LoggerConfigFormat::Compact => layer.compact().with_filter(filter).boxed(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invalid_filter_is_rejected() {
    assert!(build_logger(&LoggerConfigFormat::Compact, "relaykit_engine=loud", false).is_err());
  }

  #[test]
  fn every_format_builds() {
    for format in [
      LoggerConfigFormat::Compact,
      LoggerConfigFormat::Pretty,
      LoggerConfigFormat::Json,
    ] {
      assert!(build_logger(&format, "relaykit_engine=debug,info", true).is_ok());
    }
  }
}
