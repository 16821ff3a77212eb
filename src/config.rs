//! Runtime configuration
//!
//! Supports multiple profiles (debug, release) with different settings.

use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Gesture thresholds used by the desktop dispatcher
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Maximum age of the previous press for a press to count as a double click
    pub double_click_delay_ms: u64,
    /// Pointer travel (per axis) a press tolerates before it becomes a drag
    pub drag_start_distance: i32,
    /// Tooltip placement relative to the pointer
    pub tooltip_offset: [i32; 2],
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            double_click_delay_ms: 300,
            drag_start_distance: 4,
            tooltip_offset: [0, 20],
        }
    }
}

/// Auto-repeat timing for `KeyPressRepeat` attachments
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyRepeatConfig {
    /// Hold time before the first repeat
    pub delay_ms: u64,
    /// Time between repeats after the first one
    pub interval_ms: u64,
}

impl Default for KeyRepeatConfig {
    fn default() -> Self {
        Self {
            delay_ms: 500,
            interval_ms: 50,
        }
    }
}

impl KeyRepeatConfig {
    /// Number of repeat ticks falling in the hold interval `(before, after]`
    pub fn repeats_between(&self, before: u64, after: u64) -> u64 {
        self.ticks_until(after)
            .saturating_sub(self.ticks_until(before))
    }

    fn ticks_until(&self, held: u64) -> u64 {
        if held < self.delay_ms {
            0
        } else if self.interval_ms == 0 {
            1
        } else {
            (held - self.delay_ms) / self.interval_ms + 1
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GuiConfig {
    /// The active profile (debug, release, etc.)
    pub profile: String,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub keyboard: KeyRepeatConfig,
}

impl GuiConfig {
    /// Loads configuration based on the specified profile
    ///
    /// Profiles are loaded from config files in the following order:
    /// 1. config/{profile}.toml (profile-specific configuration)
    /// 2. Environment variables with prefix OIL_GUI_ (e.g., OIL_GUI_DISPATCH__DRAG_START_DISTANCE=6)
    ///
    /// Config files are searched for in:
    /// 1. Next to the executable
    /// 2. In the current directory (./config)
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(dir) = Self::find_config_dir() {
            let profile_path = dir.join(profile);
            builder = builder.add_source(File::from(profile_path.as_path()).required(false));
        } else {
            builder =
                builder.add_source(File::with_name(&format!("config/{}", profile)).required(false));
        }

        // Use __ as separator for nested fields (e.g., OIL_GUI_KEYBOARD__DELAY_MS)
        builder = builder.add_source(
            Environment::with_prefix("OIL_GUI")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.set_override("profile", profile)?.build()?;

        config.try_deserialize()
    }

    /// Finds the config directory by searching in multiple locations
    fn find_config_dir() -> Option<PathBuf> {
        if let Ok(exe_path) = std::env::current_exe()
            && let Some(exe_dir) = exe_path.parent()
        {
            let config_dir = exe_dir.join("config");
            if config_dir.exists() {
                return Some(config_dir);
            }
        }

        let cwd_config = PathBuf::from("config");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        None
    }

    /// Loads configuration using the OIL_GUI_PROFILE environment variable,
    /// defaulting to "release"
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let profile = std::env::var("OIL_GUI_PROFILE").unwrap_or_else(|_| "release".to_string());
        Self::load(&profile)
    }

    /// Built-in settings, used when no configuration can be loaded
    pub fn fallback(profile: &str) -> Self {
        Self {
            profile: profile.to_string(),
            dispatch: DispatchConfig::default(),
            keyboard: KeyRepeatConfig::default(),
        }
    }
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self::load("release").unwrap_or_else(|_| Self::fallback("release"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_defaults() {
        let config = GuiConfig::fallback("debug");
        assert_eq!(config.profile, "debug");
        assert_eq!(config.dispatch.double_click_delay_ms, 300);
        assert_eq!(config.dispatch.drag_start_distance, 4);
        assert_eq!(config.keyboard.delay_ms, 500);
    }

    #[test]
    fn test_load_missing_profile_uses_serde_defaults() {
        let config = GuiConfig::load("no-such-profile").unwrap();
        assert_eq!(config.profile, "no-such-profile");
        assert_eq!(config.dispatch, DispatchConfig::default());
    }

    #[test]
    fn test_repeats_between() {
        let repeat = KeyRepeatConfig {
            delay_ms: 100,
            interval_ms: 25,
        };
        assert_eq!(repeat.repeats_between(0, 99), 0);
        assert_eq!(repeat.repeats_between(0, 100), 1);
        assert_eq!(repeat.repeats_between(100, 124), 0);
        assert_eq!(repeat.repeats_between(100, 150), 2);
        assert_eq!(repeat.repeats_between(0, 200), 5);

        let once = KeyRepeatConfig {
            delay_ms: 10,
            interval_ms: 0,
        };
        assert_eq!(once.repeats_between(0, 1000), 1);
        assert_eq!(once.repeats_between(20, 1000), 0);
    }
}
