use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "locations.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub server_bind: String,
    pub log_filter: String,
    /// Where the TUI writes its logs; `None` discards them
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/locations.db"),
            server_bind: "127.0.0.1:3000".into(),
            log_filter: "info".into(),
            log_file: None,
        }
    }
}

/// Shape of `locations.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    database_path: Option<PathBuf>,
    server_bind: Option<String>,
    log_filter: Option<String>,
    log_file: Option<PathBuf>,
}

impl Settings {
    /// Defaults, then the config file (explicit path or `locations.toml` if
    /// present), then environment variables.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let mut settings = Settings::default();

        match config_path {
            Some(path) => settings.apply_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings.apply_file(default_path)?;
                }
            }
        }

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn apply_file(&mut self, path: &Path) -> anyhow::Result<()> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let file_cfg: FileSettings = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?;

        if let Some(v) = file_cfg.database_path {
            self.database_path = v;
        }
        if let Some(v) = file_cfg.server_bind {
            self.server_bind = v;
        }
        if let Some(v) = file_cfg.log_filter {
            self.log_filter = v;
        }
        if let Some(v) = file_cfg.log_file {
            self.log_file = Some(v);
        }

        Ok(())
    }

    /// Apply `LOCATIONS_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LOCATIONS_DB") {
            self.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOCATIONS_BIND") {
            self.server_bind = v;
        }
        if let Some(v) = lookup("LOCATIONS_LOG") {
            self.log_filter = v;
        }
        if let Some(v) = lookup("LOCATIONS_LOG_FILE") {
            self.log_file = Some(PathBuf::from(v));
        }
    }

    /// Create the database's parent directory if needed
    pub fn ensure_database_dir(&self) -> anyhow::Result<()> {
        let Some(parent) = self.database_path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }

        fs::create_dir_all(parent).with_context(|| {
            format!(
                "failed to create parent directory '{}' for database '{}'",
                parent.display(),
                self.database_path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn reads_values_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("locations.toml");
        fs::write(
            &path,
            "database_path = \"/tmp/x.db\"\nserver_bind = \"0.0.0.0:8080\"\n",
        )
        .expect("write config");

        let mut settings = Settings::default();
        settings.apply_file(&path).expect("apply file");

        assert_eq!(settings.database_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(settings.server_bind, "0.0.0.0:8080");
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("locations.toml");
        fs::write(&path, "databse_path = \"typo.db\"\n").expect("write config");

        assert!(Settings::default().apply_file(&path).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("LOCATIONS_DB", "env.db"),
            ("LOCATIONS_LOG", "debug"),
            ("LOCATIONS_LOG_FILE", "tui.log"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(settings.database_path, PathBuf::from("env.db"));
        assert_eq!(settings.log_filter, "debug");
        assert_eq!(settings.log_file, Some(PathBuf::from("tui.log")));
        assert_eq!(settings.server_bind, "127.0.0.1:3000");
    }

    #[test]
    fn creates_database_parent_dir() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = Settings {
            database_path: dir.path().join("nested/data/locations.db"),
            ..Settings::default()
        };

        settings.ensure_database_dir().expect("create dir");
        assert!(dir.path().join("nested/data").is_dir());
    }
}
