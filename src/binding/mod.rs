// src/binding/mod.rs
//! Two-way binding between controls and the settings store.
//!
//! Nothing in here knows about egui; the widgets in `gui::widgets`
//! implement [`BoundControl`]. The caller resolves the [`SaveValue`] a
//! control returns and routes it through [`save`].
pub mod groups;

pub use groups::{RadioGroup, TogglePair};

use crate::settings::{Key, SettingValue, SettingsError, SettingsStore};

// === Bar count constraints ===
pub const BARS_MIN: i64 = 6;
pub const BARS_MAX: i64 = 50;
pub const BARS_STEP: i64 = 2;

/// What a control hands to the save path
#[derive(Clone, Debug, PartialEq)]
pub enum SaveValue {
    /// Already in store form
    Immediate(SettingValue),

    /// The position of a slider-like control at the moment of saving.
    /// Sliders are continuous, so this is always a float; see [`coerce`].
    Slider(f64),
}

impl SaveValue {
    /// Turn into store form. Done by the caller, before [`save`].
    pub fn resolve(self) -> SettingValue {
        match self {
            SaveValue::Immediate(value) => value,
            SaveValue::Slider(position) => SettingValue::Float(position),
        }
    }
}

/// Make `incoming` fit the type `stored` already has.
///
/// Only float-into-int is handled (rounded to nearest). Anything else
/// passes through untouched and the store decides whether to accept it.
pub fn coerce(stored: &SettingValue, incoming: SettingValue) -> SettingValue {
    match (stored, incoming) {
        (SettingValue::Int(_), SettingValue::Float(v)) => SettingValue::Int(v.round() as i64),
        (_, incoming) => incoming,
    }
}

/// The single write path for every bound control
pub fn save(store: &mut SettingsStore, key: Key, value: SettingValue) -> Result<(), SettingsError> {
    let value = coerce(store.get(key), value);
    store.set(key, value)
}

/// Bar count must be even: the renderer draws paired channel columns.
/// Odd values drop to the even number below, then the result is kept
/// within the slider's range.
pub fn normalize_bars(value: i64) -> i64 {
    let even = if value % 2 != 0 { value - 1 } else { value };
    even.clamp(BARS_MIN, BARS_MAX)
}

/// A control whose state mirrors one settings key.
///
/// `Surface` is whatever the toolkit draws into (an `egui::Ui` here).
pub trait BoundControl {
    type Surface: ?Sized;

    fn key(&self) -> Key;

    /// Set the displayed state from a stored value. Used at construction,
    /// when the store changes underneath us, and to push a corrected value
    /// back into the control.
    fn load(&mut self, value: &SettingValue) -> Result<(), SettingsError>;

    /// Draw the control. Returns the value to save when the user changed it.
    fn show(&mut self, surface: &mut Self::Surface) -> Option<SaveValue>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_into_int_key_is_rounded() {
        let mut store = SettingsStore::in_memory();

        save(&mut store, Key::Margin, SaveValue::Slider(12.6).resolve()).unwrap();
        assert_eq!(store.get(Key::Margin), &SettingValue::Int(13));

        save(&mut store, Key::Sensitivity, SaveValue::Slider(149.4).resolve()).unwrap();
        assert_eq!(store.get(Key::Sensitivity), &SettingValue::Int(149));
    }

    #[test]
    fn test_saved_type_matches_stored_type() {
        let mut store = SettingsStore::in_memory();
        let writes = [
            (Key::Margin, SaveValue::Slider(3.0)),
            (Key::ItemsOffset, SaveValue::Slider(7.49)),
            (Key::NoiseReduction, SaveValue::Slider(0.5)),
            (Key::SharpCorners, SaveValue::Immediate(SettingValue::Bool(true))),
            (Key::Smoothing, SaveValue::Immediate(SettingValue::Str("monstercat".into()))),
        ];

        for (key, value) in writes {
            let before = store.get(key).kind();
            save(&mut store, key, value.resolve()).unwrap();
            assert_eq!(store.get(key).kind(), before, "{} changed type", key);
        }
    }

    #[test]
    fn test_float_key_keeps_fraction() {
        let mut store = SettingsStore::in_memory();
        save(&mut store, Key::NoiseReduction, SaveValue::Slider(0.42).resolve()).unwrap();
        assert_eq!(store.get_float(Key::NoiseReduction).unwrap(), 0.42);
    }

    #[test]
    fn test_other_mismatches_are_left_to_the_store() {
        let stored = SettingValue::Bool(false);
        let incoming = SettingValue::Float(1.0);
        assert_eq!(coerce(&stored, incoming.clone()), incoming);

        let mut store = SettingsStore::in_memory();
        assert!(save(&mut store, Key::Autosens, SaveValue::Slider(1.0).resolve()).is_err());
    }

    #[test]
    fn test_slider_resolves_to_float() {
        assert_eq!(SaveValue::Slider(36.0).resolve(), SettingValue::Float(36.0));
        let immediate = SettingValue::Str("mono".into());
        assert_eq!(SaveValue::Immediate(immediate.clone()).resolve(), immediate);
    }

    #[test]
    fn test_odd_bars_never_reach_the_store() {
        let mut store = SettingsStore::in_memory();
        assert!(save(&mut store, Key::Bars, SettingValue::Float(37.0)).is_err());
        assert_eq!(store.get(Key::Bars), &SettingValue::Int(20));

        save(&mut store, Key::Bars, SettingValue::Int(normalize_bars(37))).unwrap();
        assert_eq!(store.get(Key::Bars), &SettingValue::Int(36));
    }

    #[test]
    fn test_normalize_bars_always_even_and_in_range() {
        for raw in -10..=80 {
            let bars = normalize_bars(raw);
            assert_eq!(bars % 2, 0, "{} -> {}", raw, bars);
            assert!((BARS_MIN..=BARS_MAX).contains(&bars), "{} -> {}", raw, bars);
        }
    }

    #[test]
    fn test_odd_bar_count_drops_by_one() {
        assert_eq!(normalize_bars(37), 36);
        assert_eq!(normalize_bars(36), 36);
        assert_eq!(normalize_bars(7), 6);
        assert_eq!(normalize_bars(51), 50);
    }
}
