//! Tracing subscriber setup driven by `[observability.logging]`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingConfig, ObservabilityConfig};

/// Install the global tracing subscriber.
///
/// Filter precedence: `RUST_LOG`, then `logging.filter` appended to the
/// configured level, then the level with noisy dependencies quieted.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), TracingError> {
    let logging = &config.logging;
    let filter = build_env_filter(logging, std::env::var("RUST_LOG").ok().as_deref());

    let result = match logging.format {
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(logging.file_line)
                .with_line_number(logging.file_line);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Compact => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(true)
                .with_file(logging.file_line)
                .with_line_number(logging.file_line);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .with_file(logging.file_line)
                .with_line_number(logging.file_line);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
        }
    };

    result.map_err(|e| TracingError::Init(e.to_string()))
}

/// Build the environment filter from logging config and an optional
/// `RUST_LOG` value.
fn build_env_filter(config: &LoggingConfig, rust_log: Option<&str>) -> EnvFilter {
    let base_level = config.level.as_str();

    if let Some(env_filter) = rust_log {
        EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new(base_level))
    } else if let Some(filter) = &config.filter {
        let combined = format!("{},{}", base_level, filter);
        EnvFilter::try_new(combined).unwrap_or_else(|_| EnvFilter::new(base_level))
    } else {
        EnvFilter::new(format!(
            "{},hyper=warn,h2=warn,tower=info,sqlx=warn",
            base_level
        ))
    }
}

/// Tracing initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    fn logging(level: LogLevel, filter: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            level,
            filter: filter.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_rust_log_takes_precedence() {
        let filter = build_env_filter(&logging(LogLevel::Info, Some("lms=trace")), Some("warn"));
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_config_filter_is_appended_to_level() {
        let filter = build_env_filter(&logging(LogLevel::Debug, Some("sqlx=info")), None);
        let rendered = filter.to_string();
        assert!(rendered.contains("debug"));
        assert!(rendered.contains("sqlx=info"));
    }

    #[test]
    fn test_default_filter_quiets_dependencies() {
        let filter = build_env_filter(&logging(LogLevel::Warn, None), None);
        let rendered = filter.to_string();
        assert!(rendered.contains("sqlx=warn"));
        assert!(rendered.contains("hyper=warn"));
    }

    #[test]
    fn test_invalid_rust_log_falls_back_to_level() {
        let filter = build_env_filter(&logging(LogLevel::Error, None), Some("lms=[bad"));
        assert_eq!(filter.to_string(), "error");
    }
}
