use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dd_core::DepthConfig;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when `--config` is not given.
pub const CONFIG_ENV: &str = "DDEPTH_CONFIG";

/// Top-level TOML document. Missing sections and keys take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub depth: DepthConfig,
}

impl CliConfig {
    pub fn parse(content: &str) -> Result<Self> {
        let config: CliConfig = toml::from_str(content).context("invalid TOML configuration")?;
        config
            .depth
            .validate()
            .context("invalid [depth] configuration")?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration")
    }
}

/// Resolve the configuration: explicit path, then `DDEPTH_CONFIG`, then defaults.
pub fn load(path: Option<&Path>) -> Result<CliConfig> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));

    let Some(path) = path else {
        tracing::debug!("no configuration file, using defaults");
        return Ok(CliConfig::default());
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config =
        CliConfig::parse(&content).with_context(|| format!("in config {}", path.display()))?;
    tracing::debug!("loaded configuration from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dd_core::TangentMode;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(CliConfig::parse("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_partial_depth_section() {
        let config = CliConfig::parse(
            r#"
[depth]
max_depth = 6
tangent = "decimal"
"#,
        )
        .unwrap();
        assert_eq!(config.depth.max_depth, 6);
        assert_eq!(config.depth.tangent, TangentMode::Decimal);
        assert_eq!(config.depth.epsilon, 0.001);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(CliConfig::parse("[depth]\nmax_depth = 1\n").is_err());
        assert!(CliConfig::parse("[depth]\nepsilon = -1.0\n").is_err());
        assert!(CliConfig::parse("[depth]\ntangent = \"fixed\"\n").is_err());
        assert!(CliConfig::parse("not toml at all [").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = CliConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[depth]"));
        assert!(text.contains("max_depth = 10"));
        assert_eq!(CliConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Some(Path::new("/nonexistent/ddepth.toml"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read config"));
    }
}
