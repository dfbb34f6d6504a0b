//! Host configuration.
//!
//! `invigil.toml` tells the CLI where the record store lives and, on a
//! student machine, whose identity gets stamped onto submitted results.
//! Operator machines simply omit the `[student]` table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Identity of the student taking quizzes on this machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentIdentity {
    /// Display name, stamped onto results as `studentName`.
    pub name: String,
    /// Student number, stamped onto results as `studentNis`.
    pub nis: String,
    /// Class labels, used by roster filters.
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Top-level invigil configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding `records.json`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Identity for `take`; absent on operator machines.
    #[serde(default)]
    pub student: Option<StudentIdentity>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./invigil-data")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            student: None,
        }
    }
}

/// Loads the host configuration from the usual places.
///
/// Tries `invigil.toml` in the current directory, then
/// `~/.config/invigil/config.toml`, then falls back to defaults.
/// `INVIGIL_DATA_DIR` in the environment overrides `data_dir` either way.
pub fn load_config() -> Result<StoreConfig> {
    load_config_from(None)
}

/// Like [`load_config`], but an explicit path wins over the search order
/// and must exist.
pub fn load_config_from(path: Option<&Path>) -> Result<StoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("invigil.toml");
        if local.exists() {
            Some(local)
        } else if let Some(dir) = dirs_path() {
            let global = dir.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<StoreConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => StoreConfig::default(),
    };

    if let Ok(dir) = std::env::var("INVIGIL_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("invigil"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./invigil-data"));
        assert!(config.student.is_none());
    }

    #[test]
    fn parse_student_identity() {
        let toml_str = r#"
data_dir = "/var/lib/invigil"

[student]
name = "Siti Rahma"
nis = "2024-041"
classes = ["8A", "science-club"]
"#;
        let config: StoreConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/invigil"));
        let student = config.student.unwrap();
        assert_eq!(student.nis, "2024-041");
        assert_eq!(student.classes, vec!["8A", "science-club"]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: StoreConfig = toml::from_str("").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./invigil-data"));
        assert!(config.student.is_none());
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/no/such/invigil.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn loads_from_explicit_path_and_honors_env_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invigil.toml");
        std::fs::write(&path, "data_dir = \"./records\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./records"));

        std::env::set_var("INVIGIL_DATA_DIR", "/srv/invigil");
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/invigil"));
        std::env::remove_var("INVIGIL_DATA_DIR");
    }
}
