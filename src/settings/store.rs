use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crossbeam_channel::{unbounded, Receiver, Sender};
use directories::ProjectDirs;

use super::{ColorEntry, Key, SettingValue, SettingsError, ValueKind};
use crate::binding::normalize_bars;

/// Environment variable that points the store at a different file
pub const SETTINGS_PATH_ENV: &str = "CAVALIER_SETTINGS";

/// Key-value settings store backed by a JSON file.
///
/// Every key always has a value: whatever the file holds, overlaid on the
/// schema defaults from [`Key::default_value`]. The default also fixes each
/// key's type; writes of a different type are refused.
///
/// Lives on the UI thread. Other threads (the file watcher) only signal it.
pub struct SettingsStore {
    /// `None` for in-memory stores (tests, or no config dir available)
    path: Option<PathBuf>,

    values: BTreeMap<Key, SettingValue>,

    /// Change listeners, each scoped to a set of keys
    subscribers: Vec<Subscriber>,
}

struct Subscriber {
    keys: Vec<Key>,
    tx: Sender<Key>,
}

impl SettingsStore {
    /// Store holding only the defaults, never written to disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: defaults(),
            subscribers: Vec::new(),
        }
    }

    /// Load the store from `path`. A missing file is not an error;
    /// the file gets created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let values = load_values(&path)?;
        tracing::info!("[Store] Loaded settings from {}", path.display());

        Ok(Self {
            path: Some(path),
            values,
            subscribers: Vec::new(),
        })
    }

    /// `$CAVALIER_SETTINGS`, or `settings.json` in the platform config dir
    pub fn default_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(SETTINGS_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("io.github", "fsobolev", "Cavalier")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: Key) -> &SettingValue {
        // Populated for every key at construction, and never removed
        &self.values[&key]
    }

    pub fn get_bool(&self, key: Key) -> Result<bool, SettingsError> {
        match self.get(key) {
            SettingValue::Bool(v) => Ok(*v),
            other => Err(mismatch(key, ValueKind::Bool, other)),
        }
    }

    pub fn get_int(&self, key: Key) -> Result<i64, SettingsError> {
        match self.get(key) {
            SettingValue::Int(v) => Ok(*v),
            other => Err(mismatch(key, ValueKind::Int, other)),
        }
    }

    pub fn get_float(&self, key: Key) -> Result<f64, SettingsError> {
        match self.get(key) {
            SettingValue::Float(v) => Ok(*v),
            other => Err(mismatch(key, ValueKind::Float, other)),
        }
    }

    pub fn get_str(&self, key: Key) -> Result<&str, SettingsError> {
        match self.get(key) {
            SettingValue::Str(v) => Ok(v),
            other => Err(mismatch(key, ValueKind::Str, other)),
        }
    }

    pub fn get_colors(&self, key: Key) -> Result<&[ColorEntry], SettingsError> {
        match self.get(key) {
            SettingValue::Colors(v) => Ok(v),
            other => Err(mismatch(key, ValueKind::Colors, other)),
        }
    }

    /// Store `value` under `key`, persist, then notify subscribers of `key`.
    ///
    /// The value must already have the key's type, and may not break a
    /// key invariant (non-empty foreground, even bar count). Writing the
    /// value the key already holds does nothing (no write, no notification).
    pub fn set(&mut self, key: Key, value: SettingValue) -> Result<(), SettingsError> {
        let current = self.get(key);
        if current.kind() != value.kind() {
            return Err(mismatch(key, current.kind(), &value));
        }
        check_invariant(key, &value)?;
        if *current == value {
            return Ok(());
        }

        tracing::debug!("[Store] {} = {}", key, value);
        let previous = self.values.insert(key, value);

        if let Err(e) = self.persist() {
            if let Some(previous) = previous {
                self.values.insert(key, previous);
            }
            return Err(e);
        }

        self.notify(&[key]);
        Ok(())
    }

    /// Receive the key of every change to any of `keys`.
    ///
    /// Notifications are queued, so a subscriber that writes to the store
    /// sees its own change the next time it drains the receiver.
    pub fn subscribe(&mut self, keys: &[Key]) -> Receiver<Key> {
        let (tx, rx) = unbounded();
        self.subscribers.push(Subscriber {
            keys: keys.to_vec(),
            tx,
        });
        rx
    }

    /// Re-read the settings file after it was changed by someone else.
    ///
    /// Returns (and notifies) only the keys whose values actually changed,
    /// so re-reading our own writes is silent.
    pub fn reload(&mut self) -> Result<Vec<Key>, SettingsError> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };

        let fresh = load_values(path)?;
        let changed: Vec<Key> = Key::ALL
            .into_iter()
            .filter(|key| fresh.get(key) != self.values.get(key))
            .collect();

        if !changed.is_empty() {
            tracing::info!("[Store] Reloaded, {} key(s) changed externally", changed.len());
            self.values = fresh;
            self.notify(&changed);
        }

        Ok(changed)
    }

    /// Atomic write: temp file in the same directory, then rename over
    fn persist(&self) -> Result<(), SettingsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SettingsError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let named: BTreeMap<&str, &SettingValue> = self
            .values
            .iter()
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        let json = serde_json::to_string_pretty(&named)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| SettingsError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| SettingsError::Io {
            path: path.clone(),
            source,
        })?;

        Ok(())
    }

    fn notify(&mut self, changed: &[Key]) {
        // Drop subscribers whose receiver is gone
        self.subscribers.retain(|sub| {
            changed
                .iter()
                .filter(|key| sub.keys.contains(*key))
                .all(|key| sub.tx.send(*key).is_ok())
        });
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn defaults() -> BTreeMap<Key, SettingValue> {
    Key::ALL
        .into_iter()
        .map(|key| (key, key.default_value()))
        .collect()
}

fn mismatch(key: Key, expected: ValueKind, found: &SettingValue) -> SettingsError {
    SettingsError::TypeMismatch {
        key,
        expected,
        found: found.kind(),
    }
}

fn check_invariant(key: Key, value: &SettingValue) -> Result<(), SettingsError> {
    match (key, value) {
        (Key::FgColors, SettingValue::Colors(colors)) if colors.is_empty() => {
            Err(SettingsError::EmptyForeground)
        }
        (Key::Bars, SettingValue::Int(bars)) if normalize_bars(*bars) != *bars => {
            Err(SettingsError::InvalidBars(*bars))
        }
        _ => Ok(()),
    }
}

/// Repair a value read from disk so it satisfies the key invariants.
/// `None` means it can't be repaired and the default stays.
fn repair(key: Key, value: SettingValue) -> Option<SettingValue> {
    match (key, value) {
        (Key::FgColors, SettingValue::Colors(colors)) if colors.is_empty() => None,
        (Key::Bars, SettingValue::Int(bars)) => {
            let normalized = normalize_bars(bars);
            if normalized != bars {
                tracing::warn!("[Store] 'bars' was {}, using {}", bars, normalized);
            }
            Some(SettingValue::Int(normalized))
        }
        (_, value) => Some(value),
    }
}

/// Defaults, overlaid with every valid entry found in `path`
fn load_values(path: &Path) -> Result<BTreeMap<Key, SettingValue>, SettingsError> {
    let mut values = defaults();

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(values),
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&text)?;

    for (name, json) in raw {
        let key = match name.parse::<Key>() {
            Ok(key) => key,
            Err(_) => {
                tracing::warn!("[Store] Ignoring unknown key '{}'", name);
                continue;
            }
        };

        let value = match serde_json::from_value::<SettingValue>(json) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("[Store] Ignoring unreadable value for '{}': {}", key, e);
                continue;
            }
        };

        let expected = key.default_value().kind();
        let Some(value) = conform(value, expected) else {
            tracing::warn!(
                "[Store] '{}' should hold a {}, keeping the default",
                key,
                expected
            );
            continue;
        };
        match repair(key, value) {
            Some(value) => {
                values.insert(key, value);
            }
            None => tracing::warn!("[Store] '{}' is invalid, keeping the default", key),
        }
    }

    Ok(values)
}

/// Bring a value read from disk to the schema type, when that is lossless
/// enough. Hand-edited files often write `1` for a float or `5.0` for an int.
fn conform(value: SettingValue, expected: ValueKind) -> Option<SettingValue> {
    match (value, expected) {
        (SettingValue::Int(v), ValueKind::Float) => Some(SettingValue::Float(v as f64)),
        (SettingValue::Float(v), ValueKind::Int) => Some(SettingValue::Int(v.round() as i64)),
        (value, expected) if value.kind() == expected => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir()
            .join(format!("cavalier-prefs-test-{}", std::process::id()))
            .join(format!("{}.json", name));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn test_in_memory_store_has_every_default() {
        let store = SettingsStore::in_memory();
        for key in Key::ALL {
            assert_eq!(store.get(key), &key.default_value());
        }
        assert_eq!(store.get_int(Key::Bars).unwrap(), 20);
        assert_eq!(store.get_str(Key::Mode).unwrap(), "wave");
    }

    #[test]
    fn test_set_refuses_a_different_type() {
        let mut store = SettingsStore::in_memory();

        let err = store.set(Key::Bars, SettingValue::Str("lots".into())).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::TypeMismatch { key: Key::Bars, expected: ValueKind::Int, found: ValueKind::Str }
        ));
        assert_eq!(store.get_int(Key::Bars).unwrap(), 20);
    }

    #[test]
    fn test_typed_getter_on_wrong_type_is_an_error() {
        let store = SettingsStore::in_memory();
        assert!(store.get_bool(Key::Bars).is_err());
        assert!(store.get_colors(Key::Mode).is_err());
    }

    #[test]
    fn test_notifications_are_scoped_to_subscribed_keys() {
        let mut store = SettingsStore::in_memory();
        let colors_rx = store.subscribe(&[Key::FgColors, Key::BgColors]);
        let bars_rx = store.subscribe(&[Key::Bars]);

        store.set(Key::Bars, SettingValue::Int(30)).unwrap();
        assert_eq!(bars_rx.try_recv().unwrap(), Key::Bars);
        assert!(colors_rx.try_recv().is_err());

        store
            .set(Key::BgColors, SettingValue::Colors(vec![]))
            .unwrap();
        assert_eq!(colors_rx.try_recv().unwrap(), Key::BgColors);
        assert!(bars_rx.try_recv().is_err());
    }

    #[test]
    fn test_writing_the_same_value_is_silent() {
        let mut store = SettingsStore::in_memory();
        let rx = store.subscribe(&Key::ALL);

        store.set(Key::Autosens, SettingValue::Bool(true)).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscriber_is_forgotten() {
        let mut store = SettingsStore::in_memory();
        let rx = store.subscribe(&[Key::Bars]);
        drop(rx);

        store.set(Key::Bars, SettingValue::Int(8)).unwrap();
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_settings_path("reopen");

        let mut first = SettingsStore::open(&path).unwrap();
        first.set(Key::Bars, SettingValue::Int(36)).unwrap();
        first
            .set(
                Key::FgColors,
                SettingValue::Colors(vec![ColorEntry::new(255, 0, 0, 0.5)]),
            )
            .unwrap();

        let second = SettingsStore::open(&path).unwrap();
        assert_eq!(second.get_int(Key::Bars).unwrap(), 36);
        assert_eq!(
            second.get_colors(Key::FgColors).unwrap(),
            &[ColorEntry::new(255, 0, 0, 0.5)]
        );
        // Untouched keys keep their defaults
        assert_eq!(second.get_str(Key::Channels).unwrap(), "stereo");
    }

    #[test]
    fn test_reload_reports_only_changed_keys() {
        let path = temp_settings_path("reload");

        let mut ours = SettingsStore::open(&path).unwrap();
        let rx = ours.subscribe(&Key::ALL);
        let mut theirs = SettingsStore::open(&path).unwrap();

        // Our own write re-read is not a change
        ours.set(Key::Margin, SettingValue::Int(12)).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Key::Margin);
        assert!(ours.reload().unwrap().is_empty());

        theirs.reload().unwrap();
        theirs
            .set(Key::WidgetsStyle, SettingValue::Str("light".into()))
            .unwrap();

        assert_eq!(ours.reload().unwrap(), vec![Key::WidgetsStyle]);
        assert_eq!(rx.try_recv().unwrap(), Key::WidgetsStyle);
        assert_eq!(ours.get_str(Key::WidgetsStyle).unwrap(), "light");
    }

    #[test]
    fn test_bad_entries_fall_back_to_defaults() {
        let path = temp_settings_path("bad-entries");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{
                "bars": "many",
                "margin": 5.0,
                "noise-reduction": 1,
                "no-such-key": true,
                "sharp-corners": true
            }"#,
        )
        .unwrap();

        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(store.get_int(Key::Bars).unwrap(), 20);
        assert_eq!(store.get_int(Key::Margin).unwrap(), 5);
        assert_eq!(store.get_float(Key::NoiseReduction).unwrap(), 1.0);
        assert!(store.get_bool(Key::SharpCorners).unwrap());
    }

    #[test]
    fn test_set_refuses_to_break_invariants() {
        let mut store = SettingsStore::in_memory();

        let err = store.set(Key::FgColors, SettingValue::Colors(vec![])).unwrap_err();
        assert!(matches!(err, SettingsError::EmptyForeground));
        assert_eq!(store.get_colors(Key::FgColors).unwrap().len(), 1);

        let err = store.set(Key::Bars, SettingValue::Int(37)).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidBars(37)));
        assert!(store.set(Key::Bars, SettingValue::Int(60)).is_err());
        assert_eq!(store.get_int(Key::Bars).unwrap(), 20);
    }

    #[test]
    fn test_file_cannot_break_invariants() {
        let path = temp_settings_path("invariants");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{ "fg-colors": [], "bars": 37 }"#).unwrap();

        let store = SettingsStore::open(&path).unwrap();
        assert_eq!(store.get(Key::FgColors), &Key::FgColors.default_value());
        assert_eq!(store.get_int(Key::Bars).unwrap(), 36);
    }

    #[test]
    fn test_reload_cannot_break_invariants() {
        let path = temp_settings_path("reload-invariants");
        let mut store = SettingsStore::open(&path).unwrap();
        store.set(Key::Bars, SettingValue::Int(30)).unwrap();

        fs::write(&path, r#"{ "fg-colors": [], "bars": 41 }"#).unwrap();
        assert_eq!(store.reload().unwrap(), vec![Key::Bars]);
        assert_eq!(store.get_int(Key::Bars).unwrap(), 40);
        assert_eq!(store.get_colors(Key::FgColors).unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_settings_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(SettingsStore::open(&path), Err(SettingsError::Json(_))));
    }
}
