use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Directives appended below the configured level so connection-level noise
/// from the HTTP stack never drowns the analysis trail (fallbacks, clamps,
/// finalized contexts).
const QUIET_DEPENDENCIES: &[&str] = &["hyper=warn", "tower=warn", "mio=warn"];

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(f, "LH_APP_LOG_LEVEL '{value}': unable to build a log filter")
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Builds the service filter from the configured level: the level applies to
/// the appraisal crates, the quiet list caps transitive HTTP dependencies.
fn analysis_filter(log_level: &str) -> Result<EnvFilter, TelemetryError> {
    let mut directives = log_level.trim().to_string();
    for quiet in QUIET_DEPENDENCIES {
        directives.push(',');
        directives.push_str(quiet);
    }
    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::EnvFilter {
        value: log_level.to_string(),
        source,
    })
}

/// Installs the process-wide subscriber. `RUST_LOG` wins when set, so an
/// operator can cut a one-off filter without touching `LH_APP_LOG_LEVEL`.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => analysis_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_builds_with_the_quiet_list() {
        analysis_filter("debug").expect("plain level builds a filter");
        analysis_filter("info,lh_appraisal=trace").expect("directive lists pass through");
    }

    #[test]
    fn invalid_levels_report_the_offending_value() {
        let err = analysis_filter("===").expect_err("garbage must not build a filter");
        assert!(matches!(
            err,
            TelemetryError::EnvFilter { ref value, .. } if value == "==="
        ));
        assert!(err.to_string().contains("LH_APP_LOG_LEVEL"));
    }
}
