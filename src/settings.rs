use crate::draw::model::{Color, PenSettings};
use crate::geometry::Viewport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const SETTINGS_FILE: &str = "settings.json";
/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "PADBOARD_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AiSettings {
    /// Full `generateContent` URL of the completion service.
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,
    /// API key. Falls back to the `PADBOARD_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Request timeout in seconds.
    #[serde(default = "default_ai_timeout")]
    pub timeout_secs: u64,
}

fn default_ai_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
        .into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_ai_timeout() -> u64 {
    30
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            api_key: None,
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_ai_timeout(),
        }
    }
}

impl AiSettings {
    /// Configured key, or the environment variable when unset or blank.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// Height of the reserved header band in pixels.
    #[serde(default = "default_header_height")]
    pub header_height: f32,
    #[serde(default = "default_footer_height")]
    pub footer_height: f32,
    /// Width kept clear for the sidebar when a window is maximized.
    #[serde(default = "default_side_panel_width")]
    pub side_panel_width: f32,
    /// Maximum number of canvas snapshots kept for undo.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Interval between automatic saves of the notebook.
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_secs: u64,
    /// Key/value file standing in for browser local storage. Defaults to a
    /// file in the user's data directory.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    /// Folder receiving sketches and exported notes.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    #[serde(default = "default_pen_color")]
    pub pen_color: String,
    #[serde(default = "default_pen_size")]
    pub pen_size: u32,
    #[serde(default)]
    pub ai: AiSettings,
}

fn default_header_height() -> f32 {
    60.0
}

fn default_footer_height() -> f32 {
    40.0
}

fn default_side_panel_width() -> f32 {
    400.0
}

fn default_history_capacity() -> usize {
    crate::draw::history::DEFAULT_HISTORY_CAPACITY
}

fn default_autosave_interval() -> u64 {
    30
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

fn default_pen_color() -> String {
    "#000000".into()
}

fn default_pen_size() -> u32 {
    3
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            header_height: default_header_height(),
            footer_height: default_footer_height(),
            side_panel_width: default_side_panel_width(),
            history_capacity: default_history_capacity(),
            autosave_interval_secs: default_autosave_interval(),
            storage_path: None,
            export_dir: None,
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
            pen_color: default_pen_color(),
            pen_size: default_pen_size(),
            ai: AiSettings::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Viewport of the given size with the configured bands.
    pub fn viewport(&self, width: f32, height: f32) -> Viewport {
        Viewport::new(width, height, self.header_height, self.footer_height)
            .with_side_panel(self.side_panel_width)
    }

    pub fn pen(&self) -> PenSettings {
        let color = match Color::from_hex(&self.pen_color) {
            Some(c) => c,
            None => {
                tracing::warn!(
                    "provided pen_color '{}' is invalid; using black",
                    self.pen_color
                );
                Color::BLACK
            }
        };
        PenSettings {
            color,
            size: self.pen_size.max(1),
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs_next::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("padboard")
                .join("local_storage.json")
        })
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| {
            dirs_next::document_dir()
                .or_else(dirs_next::home_dir)
                .unwrap_or_else(std::env::temp_dir)
                .join("Padboard")
        })
    }

    pub fn autosave_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.autosave_interval_secs.max(1))
    }
}
