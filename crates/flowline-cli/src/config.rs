//! CLI configuration and on-disk layout of the data directory

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flowline_editor::EditorConfig;
use flowline_workflow_service::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.json";

/// Settings read from `config.json` in the data directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowlineConfig {
    /// Editing session settings
    pub editor: EditorConfig,
    /// Rows per page in `list`
    pub page_size: usize,
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for FlowlineConfig {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            data_dir: PathBuf::new(),
        }
    }
}

impl FlowlineConfig {
    /// Load `config.json` from `data_dir`, falling back to defaults if absent
    pub fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            serde_json::from_str::<Self>(&contents)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        } else {
            Self::default()
        };
        config.data_dir = data_dir.to_path_buf();
        Ok(config)
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.data_dir.join("workflows")
    }

    /// Users and remembered logins
    pub fn credentials_path(&self) -> PathBuf {
        self.data_dir.join("credentials.json")
    }

    /// Logins without "remember me"; lives in the temp dir so it does not
    /// outlast the machine session. Keyed by data dir so separate data dirs
    /// never share a login.
    pub fn session_path(&self) -> PathBuf {
        let key = blake3::hash(self.data_dir.as_os_str().as_encoded_bytes()).to_hex();
        std::env::temp_dir()
            .join("flowline")
            .join(format!("session-{}.json", &key[..16]))
    }

    pub fn pins_path(&self) -> PathBuf {
        self.data_dir.join("pins.json")
    }
}

/// Pinned workflow ids, stored next to the workflows
pub fn load_pins(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read pins: {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse pins: {}", path.display()))
}

pub fn save_pins(path: &Path, ids: &[String]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(ids)?)
        .with_context(|| format!("failed to write pins: {}", path.display()))?;
    log::debug!("Saved {} pins to {:?}", ids.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowline_editor::InsertPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = FlowlineConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.editor, EditorConfig::default());
        assert_eq!(config.workflows_dir(), temp_dir.path().join("workflows"));
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(CONFIG_FILE),
            r#"{"page_size": 5, "editor": {"insert_policy": "after_anchor"}}"#,
        )
        .unwrap();

        let config = FlowlineConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.editor.insert_policy, InsertPolicy::AfterAnchor);
        assert_eq!(config.editor.history_capacity, 100);
    }

    #[test]
    fn test_invalid_config_errors() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "{").unwrap();
        assert!(FlowlineConfig::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_session_path_is_per_data_dir() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let a = FlowlineConfig::load(first.path()).unwrap();
        let b = FlowlineConfig::load(second.path()).unwrap();

        assert_ne!(a.session_path(), b.session_path());
        assert_eq!(
            a.session_path(),
            FlowlineConfig::load(first.path()).unwrap().session_path()
        );
        assert!(a.session_path().starts_with(std::env::temp_dir()));
    }

    #[test]
    fn test_pins_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pins.json");
        assert!(load_pins(&path).unwrap().is_empty());

        save_pins(&path, &["#001".to_string()]).unwrap();
        assert_eq!(load_pins(&path).unwrap(), vec!["#001"]);
    }
}
