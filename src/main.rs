mod binding;
mod colors;
mod engine;
mod gui;
mod logging;
mod settings;

use anyhow::Context as _;
use eframe::egui;

use crate::gui::theme::WINDOW_SIZE;
use crate::gui::PreferencesApp;
use crate::settings::{SettingsStore, SettingsWatcher};

// ========================================================================
// SETTINGS
// ========================================================================

/// Open the settings file, or fall back to in-memory defaults so the
/// window still comes up.
fn open_store() -> SettingsStore {
    let Some(path) = SettingsStore::default_path() else {
        tracing::warn!("[Main] No config directory available, changes won't be saved");
        return SettingsStore::in_memory();
    };

    match SettingsStore::open(path.clone())
        .with_context(|| format!("opening {}", path.display()))
    {
        Ok(store) => {
            tracing::info!("[Main] Settings file: {}", path.display());
            store
        }
        Err(e) => {
            tracing::warn!("[Main] {:#}; using defaults, changes won't be saved", e);
            SettingsStore::in_memory()
        }
    }
}

fn watch_store(store: &SettingsStore) -> Option<SettingsWatcher> {
    let path = store.path()?;
    match SettingsWatcher::new(path) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            tracing::warn!("[Main] External changes won't be picked up: {}", e);
            None
        }
    }
}

// ========================================================================
// MAIN
// ========================================================================

fn main() -> anyhow::Result<()> {
    // First thing: the local UTC offset is only readable single-threaded
    let _log_guard = logging::init(logging::default_log_dir().as_deref());

    tracing::info!("[Main] cavalier-prefs {}", env!("CARGO_PKG_VERSION"));

    let store = open_store();
    let watcher = watch_store(&store);

    let viewport_builder = egui::ViewportBuilder::default()
        .with_title("Preferences")
        .with_inner_size(WINDOW_SIZE)
        .with_min_inner_size([400.0, 300.0]);

    let options = eframe::NativeOptions {
        viewport: viewport_builder,
        ..Default::default()
    };

    // Run the app (this blocks until the window closes)
    eframe::run_native(
        "cavalier-prefs",
        options,
        Box::new(move |cc| Ok(Box::new(PreferencesApp::new(&cc.egui_ctx, store, watcher)?))),
    )
    .map_err(|e| anyhow::anyhow!("preferences window failed: {}", e))?;

    tracing::info!("[Main] Preferences closed");
    Ok(())
}
