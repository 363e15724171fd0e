use anyhow::Result;
use directories::ProjectDirs;
use onote_core::keywords::PYTHON_KEYWORDS;
use onote_core::{BoundsPolicy, CoordinatorOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
}

/// Colours are `#RRGGBB` strings; `None` leaves the terminal default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub keyword_color: Option<String>,
    #[serde(default)]
    pub string_color: Option<String>,
    #[serde(default)]
    pub comment_color: Option<String>,
    #[serde(default)]
    pub search_background: Option<String>,
    #[serde(default)]
    pub suggestion_background: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    pub tab_size: usize,
    /// What happens to edits aimed past the end of the document.
    #[serde(default)]
    pub bounds: BoundsPolicy,
    pub max_suggestions: usize,
    pub line_numbers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Seed completion and highlighting with Python's keywords.
    pub python_keywords: bool,
    #[serde(default)]
    pub extra_words: Vec<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: String::from("classic"),
            keyword_color: Some(String::from("#0000FF")),
            string_color: Some(String::from("#008000")),
            comment_color: Some(String::from("#808080")),
            search_background: Some(String::from("#FFFF00")),
            suggestion_background: Some(String::from("#005F87")),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            bounds: BoundsPolicy::Clamp,
            max_suggestions: 5,
            line_numbers: true,
        }
    }
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            python_keywords: true,
            extra_words: Vec::new(),
        }
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        match Self::config_path() {
            Some(config_path) => Self::load_from(&config_path).await,
            None => {
                log::warn!("No configuration directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reads the config at `config_path`, writing defaults there when it is
    /// missing, empty or unreadable as JSON. A broken file is kept as `.bak`.
    pub async fn load_from(config_path: &Path) -> Result<Self> {
        if !try_exists(config_path).await? {
            log::info!("Config file does not exist, creating default");
            return Ok(Self::write_default(config_path).await);
        }

        let content = match tokio::fs::read_to_string(config_path).await {
            Ok(content) => content,
            Err(io_err) => {
                log::error!("Failed to read config file: {}", io_err);
                return Ok(Self::default());
            }
        };

        if content.trim().is_empty() {
            log::warn!("Config file is empty, creating new one");
            return Ok(Self::write_default(config_path).await);
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.validate();
                log::info!("Successfully loaded config from: {}", config_path.display());
                Ok(config)
            }
            Err(json_err) => {
                log::error!("Failed to parse config file: {}", json_err);

                let backup_path = config_path.with_extension("bak");
                match tokio::fs::copy(config_path, &backup_path).await {
                    Ok(_) => log::info!("Backed up broken config to: {}", backup_path.display()),
                    Err(e) => log::warn!("Failed to backup broken config: {}", e),
                }

                Ok(Self::write_default(config_path).await)
            }
        }
    }

    async fn write_default(config_path: &Path) -> Self {
        let default_config = Self::default();
        if let Err(e) = default_config.save_to(config_path).await {
            log::warn!("Failed to write default config: {}", e);
        }
        default_config
    }

    pub async fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_path() {
            self.save_to(&config_path).await?;
        }
        Ok(())
    }

    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        let mut config_to_save = self.clone();
        config_to_save.validate();

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                anyhow::anyhow!(
                    "Could not create config directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
        }

        let content = serde_json::to_string_pretty(&config_to_save)
            .map_err(|e| anyhow::anyhow!("Could not serialize config: {}", e))?;
        tokio::fs::write(config_path, content).await.map_err(|e| {
            anyhow::anyhow!(
                "Could not write config file {}: {}",
                config_path.display(),
                e
            )
        })?;

        log::info!("Successfully saved config to: {}", config_path.display());
        Ok(())
    }

    /// Replaces out-of-range values with defaults. Returns whether anything
    /// was corrected.
    pub fn validate(&mut self) -> bool {
        let mut has_issues = false;

        if self.editor.tab_size == 0 || self.editor.tab_size > 16 {
            log::warn!("Invalid tab size: {}, using default", self.editor.tab_size);
            self.editor.tab_size = 4;
            has_issues = true;
        }

        if self.editor.max_suggestions == 0 || self.editor.max_suggestions > 50 {
            log::warn!(
                "Invalid suggestion limit: {}, using default",
                self.editor.max_suggestions
            );
            self.editor.max_suggestions = 5;
            has_issues = true;
        }

        if self.theme.name.is_empty() {
            log::warn!("Empty theme name, using default");
            self.theme.name = "classic".to_string();
            has_issues = true;
        }

        let before = self.vocabulary.extra_words.len();
        self.vocabulary
            .extra_words
            .retain(|word| !word.trim().is_empty() && !word.contains(char::is_whitespace));
        if self.vocabulary.extra_words.len() != before {
            log::warn!("Dropped vocabulary entries that are blank or contain whitespace");
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }
        has_issues
    }

    pub fn coordinator_options(&self) -> CoordinatorOptions {
        let mut vocabulary: Vec<String> = Vec::new();
        if self.vocabulary.python_keywords {
            vocabulary.extend(PYTHON_KEYWORDS.iter().map(|w| w.to_string()));
        }
        vocabulary.extend(self.vocabulary.extra_words.iter().cloned());

        CoordinatorOptions {
            bounds: self.editor.bounds,
            max_suggestions: self.editor.max_suggestions,
            vocabulary,
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("ONOTE_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("ONOTE_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "onote", "onote").map(|dirs| dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    fn config_env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.theme.name, "classic");
        assert_eq!(config.editor.tab_size, 4);
        assert_eq!(config.editor.max_suggestions, 5);
        assert_eq!(config.editor.bounds, BoundsPolicy::Clamp);
        assert!(config.editor.line_numbers);
        assert!(config.vocabulary.python_keywords);
        assert!(config.vocabulary.extra_words.is_empty());
        assert_eq!(config.theme.keyword_color.as_deref(), Some("#0000FF"));
        assert_eq!(config.theme.search_background.as_deref(), Some("#FFFF00"));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = Config::default();
        config.editor.bounds = BoundsPolicy::Strict;
        config.vocabulary.extra_words = vec!["println".to_string()];

        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"theme\""));
        assert!(json.contains("\"editor\""));
        assert!(json.contains("\"vocabulary\""));
        assert!(json.contains("\"Strict\""));

        let config_from_json: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config_from_json.editor.bounds, BoundsPolicy::Strict);
        assert_eq!(config_from_json.vocabulary.extra_words, vec!["println"]);
        assert_eq!(config.theme.string_color, config_from_json.theme.string_color);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"editor": {"tab_size": 2, "max_suggestions": 8, "line_numbers": false}}"#).unwrap();
        assert_eq!(config.editor.tab_size, 2);
        assert_eq!(config.editor.bounds, BoundsPolicy::Clamp);
        assert_eq!(config.theme.name, "classic");
        assert!(config.vocabulary.python_keywords);
    }

    #[test]
    fn test_validate_corrects_values() {
        let mut config = Config::default();
        assert!(!config.validate());

        config.editor.tab_size = 0;
        config.editor.max_suggestions = 500;
        config.theme.name.clear();
        config.vocabulary.extra_words = vec!["ok".into(), "  ".into(), "two words".into()];

        assert!(config.validate());
        assert_eq!(config.editor.tab_size, 4);
        assert_eq!(config.editor.max_suggestions, 5);
        assert_eq!(config.theme.name, "classic");
        assert_eq!(config.vocabulary.extra_words, vec!["ok"]);
    }

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let config = Config::load_from(&path).await.unwrap();
        assert_eq!(config.theme.name, "classic");
        assert!(path.exists());

        let reloaded = Config::load_from(&path).await.unwrap();
        assert_eq!(reloaded.editor.tab_size, config.editor.tab_size);
    }

    #[tokio::test]
    async fn test_broken_config_is_backed_up() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let config = Config::load_from(&path).await.unwrap();
        assert_eq!(config.editor.max_suggestions, 5);

        let backup = tokio::fs::read_to_string(path.with_extension("bak")).await.unwrap();
        assert_eq!(backup, "{ not json");
        let rewritten = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(serde_json::from_str::<Config>(&rewritten).is_ok());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut config = Config::default();
        config.editor.tab_size = 8;
        config.vocabulary.python_keywords = false;
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded.editor.tab_size, 8);
        assert!(!loaded.vocabulary.python_keywords);
    }

    #[test]
    fn test_config_path_env_overrides() {
        let _guard = config_env_lock().lock().unwrap();
        let previous_dir = std::env::var("ONOTE_CONFIG_DIR").ok();
        let previous_path = std::env::var("ONOTE_CONFIG_PATH").ok();

        std::env::remove_var("ONOTE_CONFIG_PATH");
        std::env::set_var("ONOTE_CONFIG_DIR", "/tmp/onote-test");
        assert_eq!(
            Config::config_path(),
            Some(PathBuf::from("/tmp/onote-test/config.json"))
        );

        std::env::set_var("ONOTE_CONFIG_PATH", "/tmp/elsewhere.json");
        assert_eq!(Config::config_path(), Some(PathBuf::from("/tmp/elsewhere.json")));

        match previous_dir {
            Some(value) => std::env::set_var("ONOTE_CONFIG_DIR", value),
            None => std::env::remove_var("ONOTE_CONFIG_DIR"),
        }
        match previous_path {
            Some(value) => std::env::set_var("ONOTE_CONFIG_PATH", value),
            None => std::env::remove_var("ONOTE_CONFIG_PATH"),
        }
    }

    #[test]
    fn test_coordinator_options() {
        let mut config = Config::default();
        config.editor.bounds = BoundsPolicy::Strict;
        config.editor.max_suggestions = 3;
        config.vocabulary.extra_words = vec!["println".into()];

        let options = config.coordinator_options();
        assert_eq!(options.bounds, BoundsPolicy::Strict);
        assert_eq!(options.max_suggestions, 3);
        assert_eq!(options.vocabulary.len(), PYTHON_KEYWORDS.len() + 1);
        assert_eq!(options.vocabulary.last().map(String::as_str), Some("println"));

        config.vocabulary.python_keywords = false;
        assert_eq!(config.coordinator_options().vocabulary, vec!["println"]);
    }
}
