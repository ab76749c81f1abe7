use std::path::Path;

use serde::Deserialize;

use crate::error::InvmapError;
use crate::render::pdftoppm::DEFAULT_DPI;
use crate::table::enrich::EnrichOptions;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Runtime settings, loaded from an optional TOML file.
///
/// ```toml
/// [model]
/// name = "gemini-2.5-flash"
/// timeout_secs = 120
///
/// [render]
/// dpi = 200
///
/// [table]
/// serial_column = "S.No"
/// expand_column = "Service Address"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub render: RenderConfig,
    pub table: EnrichOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub api_base: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            name: DEFAULT_MODEL.into(),
            api_base: DEFAULT_API_BASE.into(),
            api_key_env: DEFAULT_API_KEY_ENV.into(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub dpi: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig { dpi: DEFAULT_DPI }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InvmapError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| InvmapError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|e| InvmapError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Table options with an empty `expand_column` meaning "no expansion".
    pub fn enrich_options(&self) -> EnrichOptions {
        let mut options = self.table.clone();
        if options
            .expand_column
            .as_deref()
            .is_some_and(|c| c.trim().is_empty())
        {
            options.expand_column = None;
        }
        options
    }

    /// The API key, read from the configured environment variable.
    pub fn api_key(&self) -> Result<String, InvmapError> {
        let env_var = &self.model.api_key_env;
        match std::env::var(env_var) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(InvmapError::MissingCredential {
                env_var: env_var.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.model.name, DEFAULT_MODEL);
        assert_eq!(config.model.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.render.dpi, DEFAULT_DPI);
        assert_eq!(config.enrich_options(), EnrichOptions::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
[model]
name = "gemini-2.5-pro"
timeout_secs = 90

[table]
expand_column = ""
"#,
        )
        .unwrap();
        assert_eq!(config.model.name, "gemini-2.5-pro");
        assert_eq!(config.model.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model.timeout_secs, Some(90));
        assert_eq!(config.table.serial_column, "S.No");
        assert_eq!(config.enrich_options().expand_column, None);
    }

    #[test]
    fn test_missing_credential() {
        let mut config = Config::default();
        config.model.api_key_env = "INVMAP_TEST_KEY_THAT_IS_NEVER_SET".into();
        assert!(matches!(
            config.api_key(),
            Err(InvmapError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_load_reports_path() {
        let err = Config::load("/nonexistent/invmap.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/invmap.toml"));
    }
}
