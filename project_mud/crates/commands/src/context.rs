use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use mud::{Output, Player, World};
use player_db::PlayerSaver;
use serde::Deserialize;
use skills::AbilityCatalog;
use thiserror::Error;

/// Everything a handler needs for one invocation.
#[derive(Clone)]
pub struct Context {
    pub world: Arc<World>,
    /// Name of the acting player.
    pub player: String,
    pub output: Arc<dyn Output>,
    pub catalog: Arc<AbilityCatalog>,
    pub saver: Arc<PlayerSaver>,
    pub help: Arc<HelpTopics>,
}

impl Context {
    pub fn send(&self, line: &str) {
        self.output.write_line(line);
    }

    /// Owned copy of the acting player, if still online.
    pub fn me(&self) -> Option<Player> {
        self.world.find_player(&self.player)
    }
}

/// Run store I/O off the async workers when inside a runtime, inline
/// otherwise.
pub(crate) fn run_blocking(job: impl FnOnce() + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(job);
        }
        Err(_) => job(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HelpTopic {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum HelpLoadError {
    #[error("failed to read help file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse help file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Named help articles, keyed by lower-cased topic.
#[derive(Debug, Clone, Default)]
pub struct HelpTopics {
    topics: HashMap<String, HelpTopic>,
}

impl HelpTopics {
    pub fn from_json(json: &str) -> Result<Self, HelpLoadError> {
        let raw: HashMap<String, HelpTopic> = serde_json::from_str(json)?;
        let topics = raw
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        Ok(Self { topics })
    }

    /// A missing file yields no topics.
    pub fn load(path: &Path) -> Result<Self, HelpLoadError> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Help file not found, no topics loaded");
            return Ok(Self::default());
        }
        let topics = Self::from_json(&std::fs::read_to_string(path)?)?;
        tracing::info!(path = %path.display(), count = topics.len(), "Help topics loaded");
        Ok(topics)
    }

    pub fn get(&self, topic: &str) -> Option<&HelpTopic> {
        self.topics.get(&topic.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_are_case_insensitive() {
        let topics =
            HelpTopics::from_json(r#"{"Rules": {"title": "Rules", "content": "Be kind."}}"#).unwrap();
        assert_eq!(topics.get("rules").unwrap().content, "Be kind.");
        assert_eq!(topics.get(" RULES ").unwrap().title, "Rules");
        assert!(topics.get("combat").is_none());
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let topics = HelpTopics::load(&dir.path().join("help.json")).unwrap();
        assert!(topics.is_empty());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("help.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(HelpTopics::load(&path), Err(HelpLoadError::Json(_))));
    }
}
