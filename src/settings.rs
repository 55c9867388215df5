//! Player settings: audio volumes, resolution and screen mode
//!
//! Persisted as JSON next to the executable, separately from level data.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Mixer level that is treated as silence
pub const SILENT_DB: f32 = -80.0;
/// Ratio change per volume button click
pub const VOLUME_STEP: f32 = 0.1;
/// Volume bar width at full volume (UI units)
pub const VOLUME_BAR_WIDTH: f32 = 100.0;

/// Resolution presets offered by the settings dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Resolution {
    /// 640x360
    Nhd,
    /// 1024x576
    Medium,
    /// 1280x720
    #[default]
    Hd,
    /// 1920x1080
    FullHd,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [Resolution::Nhd, Resolution::Medium, Resolution::Hd, Resolution::FullHd];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Nhd => "640 x 360",
            Resolution::Medium => "1024 x 576",
            Resolution::Hd => "1280 x 720",
            Resolution::FullHd => "1920 x 1080",
        }
    }

    /// (width, height) in pixels
    pub fn size(&self) -> (u32, u32) {
        match self {
            Resolution::Nhd => (640, 360),
            Resolution::Medium => (1024, 576),
            Resolution::Hd => (1280, 720),
            Resolution::FullHd => (1920, 1080),
        }
    }

    /// Dropdown index
    pub fn index(&self) -> usize {
        match self {
            Resolution::Nhd => 0,
            Resolution::Medium => 1,
            Resolution::Hd => 2,
            Resolution::FullHd => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Preset matching a screen width; unknown widths fall back to HD
    pub fn from_width(width: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|r| r.size().0 == width)
            .unwrap_or_default()
    }
}

/// Settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Background music volume (0.0 - 1.0)
    pub bgm_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Display ===
    pub resolution: Resolution,
    pub fullscreen: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bgm_volume: 0.8,
            sfx_volume: 0.2,
            resolution: Resolution::Hd,
            fullscreen: true,
        }
    }
}

/// Mixer attenuation for a volume ratio
pub fn mixer_db(ratio: f32) -> f32 {
    if ratio <= 0.0 { SILENT_DB } else { ratio.log10() * 20.0 }
}

/// Step a ratio by one click, clamped and snapped to tenths
fn step_ratio(ratio: f32, increment: bool) -> f32 {
    let next = ratio + if increment { VOLUME_STEP } else { -VOLUME_STEP };
    ((next * 10.0).round() / 10.0).clamp(0.0, 1.0)
}

impl Settings {
    /// BGM volume up/down button
    pub fn change_bgm_volume(&mut self, increment: bool) -> f32 {
        self.bgm_volume = step_ratio(self.bgm_volume, increment);
        self.bgm_volume
    }

    /// SFX volume up/down button
    pub fn change_sfx_volume(&mut self, increment: bool) -> f32 {
        self.sfx_volume = step_ratio(self.sfx_volume, increment);
        self.sfx_volume
    }

    pub fn bgm_db(&self) -> f32 {
        mixer_db(self.bgm_volume)
    }

    pub fn sfx_db(&self) -> f32 {
        mixer_db(self.sfx_volume)
    }

    pub fn bgm_bar_width(&self) -> f32 {
        self.bgm_volume * VOLUME_BAR_WIDTH
    }

    pub fn sfx_bar_width(&self) -> f32 {
        self.sfx_volume * VOLUME_BAR_WIDTH
    }

    /// Resolution dropdown changed. Unknown indices are ignored.
    pub fn set_resolution(&mut self, index: usize) -> bool {
        match Resolution::from_index(index) {
            Some(res) => {
                self.resolution = res;
                true
            }
            None => {
                log::debug!("Ignoring resolution index {}", index);
                false
            }
        }
    }

    /// Screen mode dropdown changed: 0 is fullscreen, anything else windowed
    pub fn set_fullscreen(&mut self, index: usize) {
        self.fullscreen = index == 0;
    }

    /// Screen mode dropdown index for the current mode
    pub fn fullscreen_index(&self) -> usize {
        if self.fullscreen { 0 } else { 1 }
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let loaded = std::fs::read_to_string(path)
            .map_err(crate::GameError::from)
            .and_then(|json| Ok(serde_json::from_str::<Settings>(&json)?));
        match loaded {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::info!("Using default settings ({})", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
