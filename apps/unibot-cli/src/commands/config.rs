//! Configuration display command

use anyhow::{Context, Result};
use unibot_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

/// Renders the merged configuration (defaults, file, environment) as TOML.
fn render(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).context("Failed to render configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_config() {
        let rendered = render(&AppConfig::default()).unwrap();
        assert!(rendered.contains("default_language = \"en\""));
        assert!(rendered.contains("[languages.tr]"));
        assert!(rendered.contains("fuzzy_threshold = 70"));
    }

    #[test]
    fn test_rendered_config_parses_back() {
        let rendered = render(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
