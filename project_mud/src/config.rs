use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetSection {
    pub bind_host: String,
}

impl Default for NetSection {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: "data/players.db".to_string(),
        }
    }
}

/// Top-level server configuration. The listening port is a CLI flag only.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 0 selects the lowest loaded room vnum.
    pub start_room_vnum: i32,
    pub respawn_default_minutes: u32,
    pub respawn_check_seconds: u64,
    pub autosave_minutes: u64,
    pub areas_dir: String,
    pub abilities_path: String,
    pub help_path: String,
    pub database: DatabaseSection,
    pub net: NetSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            start_room_vnum: 0,
            respawn_default_minutes: 15,
            respawn_check_seconds: 60,
            autosave_minutes: 5,
            areas_dir: "areas".to_string(),
            abilities_path: "data/abilities.json".to_string(),
            help_path: "data/help.json".to_string(),
            database: DatabaseSection::default(),
            net: NetSection::default(),
        }
    }
}

impl ServerConfig {
    /// Load from an optional JSON file. No path, or a path that does not
    /// exist, gives the defaults; a file that fails to parse is an error.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = config_path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json { path: shown, source })
    }

    pub fn respawn_interval(&self) -> Duration {
        Duration::from_secs(self.respawn_check_seconds.max(1))
    }

    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_minutes.max(1) * 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_matches_documented_values() {
        let config = ServerConfig::default();
        assert_eq!(config.start_room_vnum, 0);
        assert_eq!(config.respawn_default_minutes, 15);
        assert_eq!(config.respawn_check_seconds, 60);
        assert_eq!(config.autosave_minutes, 5);
        assert_eq!(config.areas_dir, "areas");
        assert_eq!(config.database.path, "data/players.db");
        assert_eq!(config.net.bind_host, "0.0.0.0");
    }

    #[test]
    fn load_nonexistent_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig::load(Some(&dir.path().join("missing.json"))).unwrap();
        assert_eq!(config.respawn_default_minutes, 15);
    }

    #[test]
    fn load_none_returns_defaults() {
        let config = ServerConfig::load(None).unwrap();
        assert_eq!(config.autosave_minutes, 5);
    }

    #[test]
    fn load_partial_json() {
        let mut f = NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{"start_room_vnum": 3001, "database": {{"path": "/tmp/p.db"}}}}"#
        )
        .unwrap();

        let config = ServerConfig::load(Some(f.path())).unwrap();
        assert_eq!(config.start_room_vnum, 3001);
        assert_eq!(config.database.path, "/tmp/p.db");
        assert_eq!(config.respawn_default_minutes, 15);
        assert_eq!(config.net.bind_host, "0.0.0.0");
    }

    #[test]
    fn malformed_json_is_an_error() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "{{ start_room_vnum: ").unwrap();
        assert!(matches!(
            ServerConfig::load(Some(f.path())),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn intervals_never_zero() {
        let config = ServerConfig {
            respawn_check_seconds: 0,
            autosave_minutes: 0,
            ..ServerConfig::default()
        };
        assert_eq!(config.respawn_interval(), Duration::from_secs(1));
        assert_eq!(config.autosave_interval(), Duration::from_secs(60));
    }
}
