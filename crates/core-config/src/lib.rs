//! Configuration loading and parsing.
//!
//! `textfit.toml` is looked up in the working directory first, then in the
//! platform config directory (`<config_dir>/textfit/textfit.toml`). An explicit
//! path from the binary overrides discovery. A missing or unparsable file yields
//! defaults; unknown keys are ignored so older binaries accept newer files.
//!
//! ```toml
//! [observe]
//! immediate = true
//! debounce_ms = 100
//!
//! [detect]
//! agreement_tolerance_px = 1.0
//!
//! [font]
//! family = "sans-serif"
//! size_px = 16.0
//!
//! [layout]
//! viewport_width = 1024
//! scrollbar_width = 15
//! ```
//!
//! The raw `debounce_ms` is retained; the effective value is clamped to
//! `MAX_DEBOUNCE_MS` when the config is loaded.

use anyhow::Result;
use core_text::FontSpec;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "textfit.toml";
pub const MAX_DEBOUNCE_MS: u64 = 60_000;

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ObserveConfig {
    #[serde(default = "ObserveConfig::default_immediate")]
    pub immediate: bool,
    #[serde(default = "ObserveConfig::default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ObserveConfig {
    fn default() -> Self {
        Self {
            immediate: Self::default_immediate(),
            debounce_ms: Self::default_debounce_ms(),
        }
    }
}

impl ObserveConfig {
    const fn default_immediate() -> bool {
        true
    }
    const fn default_debounce_ms() -> u64 {
        100
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DetectConfig {
    /// Largest range/clone width difference still reported as agreement.
    #[serde(default = "DetectConfig::default_tolerance")]
    pub agreement_tolerance_px: f64,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            agreement_tolerance_px: Self::default_tolerance(),
        }
    }
}

impl DetectConfig {
    const fn default_tolerance() -> f64 {
        1.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FontConfig {
    #[serde(default = "FontConfig::default_family")]
    pub family: String,
    #[serde(default = "FontConfig::default_size_px")]
    pub size_px: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: Self::default_family(),
            size_px: Self::default_size_px(),
        }
    }
}

impl FontConfig {
    fn default_family() -> String {
        "sans-serif".to_string()
    }
    const fn default_size_px() -> f64 {
        16.0
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_viewport_width")]
    pub viewport_width: f64,
    #[serde(default = "LayoutConfig::default_scrollbar_width")]
    pub scrollbar_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: Self::default_viewport_width(),
            scrollbar_width: Self::default_scrollbar_width(),
        }
    }
}

impl LayoutConfig {
    const fn default_viewport_width() -> f64 {
        1024.0
    }
    const fn default_scrollbar_width() -> f64 {
        15.0
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub observe: ObserveConfig,
    #[serde(default)]
    pub detect: DetectConfig,
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
    pub effective_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_file(ConfigFile::default(), None, None)
    }
}

/// Best-effort config path: working directory first, then the platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("textfit").join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_not_found_using_defaults");
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config::from_file(file, Some(content), Some(path)))
        }
        Err(err) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %err,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}

impl Config {
    pub fn from_file(file: ConfigFile, raw: Option<String>, source: Option<PathBuf>) -> Self {
        let mut cfg = Self {
            raw,
            source,
            file,
            effective_debounce_ms: 0,
        };
        cfg.clamp();
        cfg
    }

    /// Clamp the debounce window; returns the effective value.
    pub fn clamp(&mut self) -> u64 {
        let raw = self.file.observe.debounce_ms;
        let clamped = raw.min(MAX_DEBOUNCE_MS);
        if clamped != raw {
            info!(
                target: "config",
                raw,
                clamped,
                max = MAX_DEBOUNCE_MS,
                "debounce_ms_clamped"
            );
        }
        self.effective_debounce_ms = clamped;
        clamped
    }

    /// Document default font described by `[font]`.
    pub fn default_font(&self) -> FontSpec {
        FontSpec::new(self.file.font.family.clone(), self.file.font.size_px)
    }

    /// Whether two strategy widths count as agreeing.
    pub fn widths_agree(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.file.detect.agreement_tolerance_px
    }
}
