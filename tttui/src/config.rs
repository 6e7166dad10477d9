use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::{io::Write, os::unix::fs::OpenOptionsExt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TttuiConfig {
    /// Base URL of the Toggl Track API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_workspace_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_client_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_project_id: Option<i64>,
}

fn default_api_url() -> String {
    toggl::DEFAULT_API_URL.to_string()
}

impl Default for TttuiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            last_workspace_id: None,
            last_client_id: None,
            last_project_id: None,
        }
    }
}

pub fn root_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join("tttui"))
}

/// The file may hold the API token, so on unix it is only readable by its owner.
fn secure_write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    {
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?
            .write_all(content.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(path, content)?;
    }

    Ok(())
}

impl TttuiConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(root_path()?.join("config.toml"))
    }

    /// Load config from disk. Returns default config if file doesn't exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self)?;
        secure_write(path, &raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Update the stored config in place and write it back.
    pub fn update(change: impl FnOnce(&mut Self)) -> Result<Self> {
        let mut config = Self::load()?;
        change(&mut config);
        config.save()?;
        Ok(config)
    }

    /// Create a default config file if none exists and return its path.
    pub fn ensure_exists() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }
}

/// Numeric id from an environment variable.
///
/// Unset or empty yields `None`; anything that is not an integer is reported
/// and ignored.
pub fn env_id(name: &str) -> Option<i64> {
    let raw = std::env::var(name).ok()?;
    parse_id(name, &raw)
}

fn parse_id(name: &str, raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            eprintln!("Warning: ignoring {name}={raw}, expected a numeric id");
            tracing::warn!(%name, %raw, "invalid id in environment");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tttui-test-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = TttuiConfig::load_from(&temp_path("missing")).unwrap();
        assert_eq!(config, TttuiConfig::default());
        assert_eq!(config.api_url, "https://api.track.toggl.com/api/v9");
    }

    #[test]
    fn save_and_load_keeps_selections() {
        let path = temp_path("roundtrip");
        let config = TttuiConfig {
            api_token: Some("secret".to_string()),
            last_workspace_id: Some(7),
            last_project_id: Some(99),
            ..TttuiConfig::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(TttuiConfig::load_from(&path).unwrap(), config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: TttuiConfig = toml::from_str("last_client_id = 3").unwrap();
        assert_eq!(config.last_client_id, Some(3));
        assert_eq!(config.api_url, default_api_url());
        assert_eq!(config.api_token, None);
    }

    #[test]
    fn ids_from_environment_are_validated() {
        assert_eq!(parse_id("TOGGL_PROJECT", " 42 "), Some(42));
        assert_eq!(parse_id("TOGGL_CLIENT", "0"), Some(0));
        assert_eq!(parse_id("TOGGL_PROJECT", ""), None);
        assert_eq!(parse_id("TOGGL_PROJECT", "abc"), None);
    }
}
