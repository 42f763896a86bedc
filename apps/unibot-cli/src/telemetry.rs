//! Telemetry initialization (logging)

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const WORKSPACE_TARGETS: [&str; 4] = ["unibot", "unibot_core", "unibot_nlp", "unibot_conversation"];

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `level` applies to the workspace
/// crates and everything else stays at `warn`. Logs go to stderr.
pub fn init_telemetry(level: &str, json_logs: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive(level)))
        .context("Failed to create environment filter")?;

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init()
            .context("Failed to install log subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    Ok(())
}

/// Filter directive applying `level` to the workspace crates.
fn directive(level: &str) -> String {
    let level = level.to_lowercase();
    let mut parts = vec!["warn".to_string()];
    parts.extend(WORKSPACE_TARGETS.iter().map(|target| format!("{}={}", target, level)));
    parts.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive() {
        assert_eq!(
            directive("DEBUG"),
            "warn,unibot=debug,unibot_core=debug,unibot_nlp=debug,unibot_conversation=debug"
        );
    }

    #[test]
    fn test_directive_is_a_valid_filter() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(directive(level)).is_ok());
        }
    }
}
