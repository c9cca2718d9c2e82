//! Tracing subscriber setup for the `lmisdp` binary.

use clap::ValueEnum;
use std::error::Error;
use std::io;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Resolve the filter directive: the CLI flag wins over `LMISDP_TRACE`.
fn directive(level: Option<&str>, env_value: Option<String>) -> Option<String> {
    level
        .map(str::to_string)
        .or(env_value)
        .filter(|value| !value.eq_ignore_ascii_case("off"))
}

/// Install the global subscriber writing to stderr.
///
/// Without a level and without `LMISDP_TRACE` nothing is installed.
pub fn init_tracing(level: Option<&str>, format: LogFormat) -> Result<(), Box<dyn Error>> {
    let Some(directive) = directive(level, std::env::var("LMISDP_TRACE").ok()) else {
        return Ok(());
    };
    let filter =
        EnvFilter::try_new(&directive).map_err(|err| format!("Invalid log filter: {err}"))?;

    let layer = fmt::layer().with_writer(io::stderr);
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(layer.pretty()).try_init()?,
        LogFormat::Json => registry.with(layer.json()).try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::directive;

    #[test]
    fn flag_overrides_environment() {
        assert_eq!(
            directive(Some("debug"), Some("warn".to_string())).as_deref(),
            Some("debug")
        );
        assert_eq!(
            directive(None, Some("lmisdp_core=trace".to_string())).as_deref(),
            Some("lmisdp_core=trace")
        );
    }

    #[test]
    fn off_installs_nothing() {
        assert_eq!(directive(None, None), None);
        assert_eq!(directive(Some("OFF"), Some("debug".to_string())), None);
    }
}
