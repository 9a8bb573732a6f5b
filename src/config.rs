use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PaletteResult;
use crate::services::format::NumberLocale;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub behavior: BehaviorConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Global open/close combo, e.g. `<Ctrl>k`
    pub toggle_shortcut: String,
    /// Modifier prefix for the numbered quick-jumps, e.g. `<Ctrl>` gives `<Ctrl>1`..`<Ctrl>9`
    pub quick_jump_modifier: String,
    pub quick_jump_count: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub max_results: u32,
    pub history_capacity: u32,
    /// Recent items shown on the home view
    pub recent_limit: u32,
    pub number_locale: NumberLocale,
}

/// Everything the host injects into the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub spaces: Vec<SpaceConfig>,
    pub assistant_commands: Vec<NodeConfig>,
    pub quick_links: Vec<QuickLinkConfig>,
    /// Replaces the built-in universal actions when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<NodeConfig>>,
    /// Replaces the built-in theme list when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<NodeConfig>>,
}

/// Fields shared by every configured catalog entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub sublabel: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    /// Navigation target; derived from ids when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    /// Explicit sibling order; declaration order breaks ties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default)]
    pub frequency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceConfig {
    #[serde(flatten)]
    pub node: NodeConfig,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(flatten)]
    pub node: NodeConfig,
    #[serde(default)]
    pub modules: Vec<NodeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickLinkConfig {
    pub id: String,
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub sublabel: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl QuickLinkConfig {
    pub fn has_query_placeholder(&self) -> bool {
        self.url.contains("{query}")
    }
}

/// Replace a `{query}` placeholder with the URL-encoded query.
pub fn resolve_url(url: &str, query: &str) -> String {
    if url.contains("{query}") {
        url.replace("{query}", &urlencoding::encode(query))
    } else {
        url.to_string()
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            toggle_shortcut: "<Ctrl>k".to_string(),
            quick_jump_modifier: "<Ctrl>".to_string(),
            quick_jump_count: 9,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            max_results: 12,
            history_capacity: 50,
            recent_limit: 5,
            number_locale: NumberLocale::Fr,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("wayfinder")
            .join("config.toml")
    }

    /// Load config from the default location, or return defaults if missing or broken
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load and validate config from a specific file
    pub fn load_from(path: &Path) -> PaletteResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from TOML text
    pub fn from_toml_str(content: &str) -> PaletteResult<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Validate and clamp config values to acceptable ranges
    pub fn validate(&mut self) {
        self.behavior.max_results = self.behavior.max_results.clamp(1, 15);
        self.behavior.history_capacity = self.behavior.history_capacity.clamp(1, 500);
        self.behavior.recent_limit = self.behavior.recent_limit.min(20);
        self.general.quick_jump_count = self.general.quick_jump_count.min(9);
    }

    /// Save config to its default path
    pub fn save(&self) -> PaletteResult<()> {
        self.save_to(&Self::config_path())
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> PaletteResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
