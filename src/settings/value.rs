use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::SettingsError;

/// Every key the visualizer reads from the settings store
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    // === Cavalier (drawing) ===
    Mode,
    Margin,
    ItemsOffset,
    SharpCorners,

    // === CAVA (analysis) ===
    Bars,
    Autosens,
    Sensitivity,
    Channels,
    Smoothing,
    NoiseReduction,

    // === Colors ===
    WidgetsStyle,
    FgColors,
    BgColors,
}

impl Key {
    pub const ALL: [Key; 13] = [
        Key::Mode,
        Key::Margin,
        Key::ItemsOffset,
        Key::SharpCorners,
        Key::Bars,
        Key::Autosens,
        Key::Sensitivity,
        Key::Channels,
        Key::Smoothing,
        Key::NoiseReduction,
        Key::WidgetsStyle,
        Key::FgColors,
        Key::BgColors,
    ];

    /// Name used in the settings file
    pub fn as_str(self) -> &'static str {
        match self {
            Key::Mode => "mode",
            Key::Margin => "margin",
            Key::ItemsOffset => "items-offset",
            Key::SharpCorners => "sharp-corners",
            Key::Bars => "bars",
            Key::Autosens => "autosens",
            Key::Sensitivity => "sensitivity",
            Key::Channels => "channels",
            Key::Smoothing => "smoothing",
            Key::NoiseReduction => "noise-reduction",
            Key::WidgetsStyle => "widgets-style",
            Key::FgColors => "fg-colors",
            Key::BgColors => "bg-colors",
        }
    }

    /// Value used when the settings file has nothing (valid) for this key.
    ///
    /// The variant returned here also fixes the type the key holds for the
    /// lifetime of the store.
    pub fn default_value(self) -> SettingValue {
        match self {
            Key::Mode => SettingValue::Str("wave".to_string()),
            Key::Margin => SettingValue::Int(0),
            Key::ItemsOffset => SettingValue::Int(10),
            Key::SharpCorners => SettingValue::Bool(false),
            Key::Bars => SettingValue::Int(20),
            Key::Autosens => SettingValue::Bool(true),
            Key::Sensitivity => SettingValue::Int(100),
            Key::Channels => SettingValue::Str("stereo".to_string()),
            Key::Smoothing => SettingValue::Str("off".to_string()),
            Key::NoiseReduction => SettingValue::Float(0.77),
            Key::WidgetsStyle => SettingValue::Str("dark".to_string()),
            Key::FgColors => SettingValue::Colors(vec![ColorEntry::new(53, 132, 228, 1.0)]),
            Key::BgColors => SettingValue::Colors(vec![ColorEntry::new(30, 30, 30, 1.0)]),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Key {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// A single stored value.
///
/// Untagged so the settings file stays plain JSON (`"bars": 20`).
/// Variant order matters for deserialization: integers must be tried
/// before floats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Colors(Vec<ColorEntry>),
}

impl SettingValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SettingValue::Bool(_) => ValueKind::Bool,
            SettingValue::Int(_) => ValueKind::Int,
            SettingValue::Float(_) => ValueKind::Float,
            SettingValue::Str(_) => ValueKind::Str,
            SettingValue::Colors(_) => ValueKind::Colors,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(v) => write!(f, "{}", v),
            SettingValue::Int(v) => write!(f, "{}", v),
            SettingValue::Float(v) => write!(f, "{:.2}", v),
            SettingValue::Str(v) => write!(f, "'{}'", v),
            SettingValue::Colors(v) => write!(f, "{} color(s)", v.len()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    Colors,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Colors => "color list",
        };
        f.write_str(name)
    }
}

/// Stored RGBA color: 0-255 channels, 0.0-1.0 alpha.
///
/// Written to disk as a 4-element array, `[r, g, b, a]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(u8, u8, u8, f32)", into = "(u8, u8, u8, f32)")]
pub struct ColorEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl ColorEntry {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Convert a color picker's unit RGBA into the stored form.
    /// RGB is rounded to the nearest 0-255 step, alpha is kept as-is.
    pub fn from_unit_rgba(rgba: [f32; 4]) -> Self {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            r: channel(rgba[0]),
            g: channel(rgba[1]),
            b: channel(rgba[2]),
            a: rgba[3],
        }
    }
}

impl From<(u8, u8, u8, f32)> for ColorEntry {
    fn from((r, g, b, a): (u8, u8, u8, f32)) -> Self {
        Self { r, g, b, a }
    }
}

impl From<ColorEntry> for (u8, u8, u8, f32) {
    fn from(c: ColorEntry) -> Self {
        (c.r, c.g, c.b, c.a)
    }
}
