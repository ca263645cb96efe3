//! Project configuration read from `.kodebase/config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cascade::CascadePolicy;
use crate::models::actor::Actor;

/// Directory holding kodebase state, relative to the project root.
pub const KODEBASE_DIR: &str = ".kodebase";
pub const CONFIG_FILE: &str = "config.toml";
/// Environment variable consulted when no `--actor` is given.
pub const ACTOR_ENV: &str = "KODEBASE_ACTOR";

fn default_artifacts_dir() -> PathBuf {
    Path::new(KODEBASE_DIR).join("artifacts")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KodebaseConfig {
    /// Artifact tree root, relative to the project root unless absolute.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    /// Actor used for writes when neither `--actor` nor the environment
    /// provides one. `Name (email)` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_actor: Option<String>,
    #[serde(default)]
    pub cascade: CascadePolicy,
}

impl Default for KodebaseConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
            default_actor: None,
            cascade: CascadePolicy::default(),
        }
    }
}

impl KodebaseConfig {
    /// Load `<project_root>/.kodebase/config.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(KODEBASE_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: KodebaseConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        Ok(config)
    }

    pub fn save(&self, project_root: &Path) -> Result<()> {
        let dir = project_root.join(KODEBASE_DIR);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let config_path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;
        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        Ok(())
    }

    /// Absolute artifacts directory for `project_root`.
    pub fn artifacts_path(&self, project_root: &Path) -> PathBuf {
        if self.artifacts_dir.is_absolute() {
            self.artifacts_dir.clone()
        } else {
            project_root.join(&self.artifacts_dir)
        }
    }

    /// Resolve the actor for a write: explicit flag, then `KODEBASE_ACTOR`,
    /// then `default_actor`.
    pub fn resolve_actor(&self, explicit: Option<&str>) -> Result<Actor> {
        let env_actor = std::env::var(ACTOR_ENV).ok();
        self.resolve_actor_from(explicit, env_actor.as_deref())
    }

    pub(crate) fn resolve_actor_from(
        &self,
        explicit: Option<&str>,
        env_actor: Option<&str>,
    ) -> Result<Actor> {
        let (raw, source) = if let Some(value) = explicit {
            (value, "--actor")
        } else if let Some(value) = env_actor.filter(|v| !v.trim().is_empty()) {
            (value, ACTOR_ENV)
        } else if let Some(value) = self.default_actor.as_deref() {
            (value, "default_actor")
        } else {
            anyhow::bail!(
                "No actor configured. Pass --actor, set {ACTOR_ENV}, or set default_actor in {KODEBASE_DIR}/{CONFIG_FILE}"
            );
        };

        Actor::parse(raw).with_context(|| format!("Invalid actor from {source}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::CompletionThreshold;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = KodebaseConfig::load(temp.path()).unwrap();
        assert_eq!(config, KodebaseConfig::default());
        assert_eq!(config.artifacts_dir, PathBuf::from(".kodebase/artifacts"));
        assert_eq!(config.cascade.completion, CompletionThreshold::All);
    }

    #[test]
    fn test_parse_quorum_policy() {
        let config: KodebaseConfig = toml::from_str(
            r#"
default_actor = "Jane Doe (jane@example.com)"

[cascade]
completion = { quorum = 75 }
"#,
        )
        .unwrap();
        assert_eq!(config.cascade.completion, CompletionThreshold::Quorum(75));
        assert_eq!(config.artifacts_dir, PathBuf::from(".kodebase/artifacts"));
    }

    #[test]
    fn test_parse_all_policy() {
        let config: KodebaseConfig = toml::from_str(
            r#"
artifacts_dir = "work/artifacts"

[cascade]
completion = "all"
"#,
        )
        .unwrap();
        assert_eq!(config.cascade.completion, CompletionThreshold::All);
        assert_eq!(
            config.artifacts_path(Path::new("/repo")),
            PathBuf::from("/repo/work/artifacts")
        );
    }

    #[test]
    fn test_save_load() {
        let temp = TempDir::new().unwrap();
        let config = KodebaseConfig {
            default_actor: Some("Jane Doe (jane@example.com)".to_string()),
            ..KodebaseConfig::default()
        };
        config.save(temp.path()).unwrap();
        assert_eq!(KodebaseConfig::load(temp.path()).unwrap(), config);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(KODEBASE_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(CONFIG_FILE), "cascade = [").unwrap();
        assert!(KodebaseConfig::load(temp.path()).is_err());
    }

    #[test]
    fn test_actor_resolution_order() {
        let config = KodebaseConfig {
            default_actor: Some("Default Person (default@example.com)".to_string()),
            ..KodebaseConfig::default()
        };

        let actor = config
            .resolve_actor_from(Some("Flag Person (flag@example.com)"), Some("Env Person (env@example.com)"))
            .unwrap();
        assert_eq!(actor.email(), "flag@example.com");

        let actor = config
            .resolve_actor_from(None, Some("Env Person (env@example.com)"))
            .unwrap();
        assert_eq!(actor.email(), "env@example.com");

        let actor = config.resolve_actor_from(None, Some("  ")).unwrap();
        assert_eq!(actor.email(), "default@example.com");
    }

    #[test]
    fn test_actor_resolution_errors() {
        let config = KodebaseConfig::default();
        assert!(config.resolve_actor_from(None, None).is_err());
        assert!(config.resolve_actor_from(Some("no email"), None).is_err());
    }
}
