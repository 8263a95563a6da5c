//! Typed view of the settings the visualizer engine consumes.
//!
//! The engine itself (capture, analysis, drawing) lives elsewhere and reads
//! the same store; the preferences window never calls into it.

use std::fmt;

use crate::settings::{ColorEntry, Key, SettingsError, SettingsStore};

/// A closed set of string values stored under one key
pub trait Choice: Copy + PartialEq + Sized + 'static {
    const ALL: &'static [Self];

    /// Stored form
    fn as_str(self) -> &'static str;

    /// Text shown on the control
    fn label(self) -> &'static str;

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawingMode {
    Wave,
    Levels,
    Bars,
}

impl Choice for DrawingMode {
    const ALL: &'static [Self] = &[DrawingMode::Wave, DrawingMode::Levels, DrawingMode::Bars];

    fn as_str(self) -> &'static str {
        match self {
            DrawingMode::Wave => "wave",
            DrawingMode::Levels => "levels",
            DrawingMode::Bars => "bars",
        }
    }

    fn label(self) -> &'static str {
        match self {
            DrawingMode::Wave => "Wave",
            DrawingMode::Levels => "Levels",
            DrawingMode::Bars => "Bars",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    Mono,
    Stereo,
}

impl Choice for Channels {
    const ALL: &'static [Self] = &[Channels::Mono, Channels::Stereo];

    fn as_str(self) -> &'static str {
        match self {
            Channels::Mono => "mono",
            Channels::Stereo => "stereo",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Channels::Mono => "Mono",
            Channels::Stereo => "Stereo",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Smoothing {
    Off,
    Monstercat,
}

impl Choice for Smoothing {
    const ALL: &'static [Self] = &[Smoothing::Off, Smoothing::Monstercat];

    fn as_str(self) -> &'static str {
        match self {
            Smoothing::Off => "off",
            Smoothing::Monstercat => "monstercat",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Smoothing::Off => "Off",
            Smoothing::Monstercat => "Monstercat",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetStyle {
    Light,
    Dark,
}

impl Choice for WidgetStyle {
    const ALL: &'static [Self] = &[WidgetStyle::Light, WidgetStyle::Dark];

    fn as_str(self) -> &'static str {
        match self {
            WidgetStyle::Light => "light",
            WidgetStyle::Dark => "dark",
        }
    }

    fn label(self) -> &'static str {
        match self {
            WidgetStyle::Light => "Light",
            WidgetStyle::Dark => "Dark",
        }
    }
}

/// Read a choice key, failing on values outside the set
pub fn read_choice<C: Choice>(store: &SettingsStore, key: Key) -> Result<C, SettingsError> {
    let raw = store.get_str(key)?;
    C::parse(raw).ok_or_else(|| SettingsError::InvalidChoice {
        key,
        value: raw.to_string(),
    })
}

/// Everything the engine reads, in engine types
#[derive(Clone, Debug, PartialEq)]
pub struct EngineParams {
    // === Drawing ===
    pub mode: DrawingMode,
    /// Gap around the drawing area, pixels
    pub margin: u32,
    /// Space between items in levels/bars modes, percent
    pub items_offset: u32,
    pub sharp_corners: bool,

    // === Analysis ===
    /// Always even
    pub bars: u32,
    pub autosens: bool,
    pub sensitivity: u32,
    pub channels: Channels,
    pub smoothing: Smoothing,
    /// 0.0 noisy .. 1.0 smooth
    pub noise_reduction: f64,

    // === Colors ===
    pub widget_style: WidgetStyle,
    pub fg_colors: Vec<ColorEntry>,
    pub bg_colors: Vec<ColorEntry>,
}

impl EngineParams {
    pub fn from_store(store: &SettingsStore) -> Result<Self, SettingsError> {
        let unsigned = |key: Key| -> Result<u32, SettingsError> {
            Ok(store.get_int(key)?.clamp(0, u32::MAX as i64) as u32)
        };

        Ok(Self {
            mode: read_choice(store, Key::Mode)?,
            margin: unsigned(Key::Margin)?,
            items_offset: unsigned(Key::ItemsOffset)?,
            sharp_corners: store.get_bool(Key::SharpCorners)?,
            bars: unsigned(Key::Bars)?,
            autosens: store.get_bool(Key::Autosens)?,
            sensitivity: unsigned(Key::Sensitivity)?,
            channels: read_choice(store, Key::Channels)?,
            smoothing: read_choice(store, Key::Smoothing)?,
            noise_reduction: store.get_float(Key::NoiseReduction)?,
            widget_style: read_choice(store, Key::WidgetsStyle)?,
            fg_colors: store.get_colors(Key::FgColors)?.to_vec(),
            bg_colors: store.get_colors(Key::BgColors)?.to_vec(),
        })
    }
}

impl fmt::Display for EngineParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={} bars={} channels={} smoothing={} sens={}{} nr={:.2} colors={}/{}",
            self.mode.as_str(),
            self.bars,
            self.channels.as_str(),
            self.smoothing.as_str(),
            self.sensitivity,
            if self.autosens { " (auto)" } else { "" },
            self.noise_reduction,
            self.fg_colors.len(),
            self.bg_colors.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingValue;

    #[test]
    fn test_defaults_produce_valid_params() {
        let params = EngineParams::from_store(&SettingsStore::in_memory()).unwrap();
        assert_eq!(params.mode, DrawingMode::Wave);
        assert_eq!(params.channels, Channels::Stereo);
        assert_eq!(params.widget_style, WidgetStyle::Dark);
        assert_eq!(params.bars % 2, 0);
        assert_eq!(params.fg_colors.len(), 1);
    }

    #[test]
    fn test_choice_parse() {
        assert_eq!(Smoothing::parse("monstercat"), Some(Smoothing::Monstercat));
        assert_eq!(Smoothing::parse("Monstercat"), None);
        for mode in DrawingMode::ALL {
            assert_eq!(DrawingMode::parse(mode.as_str()), Some(*mode));
        }
    }

    #[test]
    fn test_unknown_choice_is_reported() {
        let mut store = SettingsStore::in_memory();
        store.set(Key::Mode, SettingValue::Str("spiral".into())).unwrap();

        let err = EngineParams::from_store(&store).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidChoice { key: Key::Mode, .. }));
    }
}
