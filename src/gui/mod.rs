// src/gui/mod.rs
pub mod color_grid;
pub mod pages;
pub mod theme;
pub mod widgets;

use std::time::Duration;

use crossbeam_channel::Receiver;
use eframe::egui;

use crate::engine::{read_choice, EngineParams, WidgetStyle};
use crate::gui::pages::{CavaPage, CavalierPage, ColorsPage, SettingsPage};
use crate::gui::widgets::tab_bar;
use crate::settings::{Key, SettingsError, SettingsStore, SettingsWatcher};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsTab {
    Cavalier,
    Cava,
    Colors,
}

impl SettingsTab {
    pub const ALL: [SettingsTab; 3] = [SettingsTab::Cavalier, SettingsTab::Cava, SettingsTab::Colors];

    pub fn label(self) -> &'static str {
        match self {
            SettingsTab::Cavalier => "Cavalier",
            SettingsTab::Cava => "CAVA",
            SettingsTab::Colors => "Colors",
        }
    }
}

const COLOR_KEYS: [Key; 2] = [Key::FgColors, Key::BgColors];

/// The preferences window: three tabs of controls bound to the store
pub struct PreferencesApp {
    store: SettingsStore,

    /// Tells us when another process rewrote the settings file
    watcher: Option<SettingsWatcher>,

    /// Changes to the color lists (rebuild the grid)
    color_rx: Receiver<Key>,

    /// Changes to every other key (refresh the matching control)
    control_rx: Receiver<Key>,

    /// Current active settings tab
    active_tab: SettingsTab,

    cavalier: CavalierPage,
    cava: CavaPage,
    colors: ColorsPage,
}

impl PreferencesApp {
    pub fn new(
        ctx: &egui::Context,
        mut store: SettingsStore,
        watcher: Option<SettingsWatcher>,
    ) -> Result<Self, SettingsError> {
        // Subscribe before anything reads, so no change slips in between
        let color_rx = store.subscribe(&COLOR_KEYS);
        let control_keys: Vec<Key> = Key::ALL
            .into_iter()
            .filter(|key| !COLOR_KEYS.contains(key))
            .collect();
        let control_rx = store.subscribe(&control_keys);

        theme::apply_widget_style(ctx, read_choice(&store, Key::WidgetsStyle)?);

        let cavalier = CavalierPage::new(&store)?;
        let cava = CavaPage::new(&store)?;
        let colors = ColorsPage::new(&store)?;

        let params = EngineParams::from_store(&store)?;
        tracing::info!("[Prefs] Loaded: {}", params);

        Ok(Self {
            store,
            watcher,
            color_rx,
            control_rx,
            active_tab: SettingsTab::Cavalier,
            cavalier,
            cava,
            colors,
        })
    }

    /// Pull in external file changes and queued notifications
    fn sync_with_store(&mut self, ctx: &egui::Context) {
        if self.watcher.as_ref().is_some_and(|w| w.poll_changed()) {
            if let Err(e) = self.store.reload() {
                tracing::warn!("[Prefs] Could not reload settings: {}", e);
            }
        }

        // Several color writes in one frame still mean one rebuild
        let mut rebuild = false;
        while self.color_rx.try_recv().is_ok() {
            rebuild = true;
        }
        if rebuild {
            self.colors.grid_mut().request_rebuild(&self.store);
        }

        while let Ok(key) = self.control_rx.try_recv() {
            self.cavalier.reload(key, &self.store);
            self.cava.reload(key, &self.store);
            self.colors.reload(key, &self.store);

            if key == Key::WidgetsStyle {
                match read_choice::<WidgetStyle>(&self.store, key) {
                    Ok(style) => theme::apply_widget_style(ctx, style),
                    Err(e) => tracing::warn!("[Prefs] {}", e),
                }
            }
        }
    }

    fn log_params(&self) {
        match EngineParams::from_store(&self.store) {
            Ok(params) => tracing::debug!("[Prefs] Saved: {}", params),
            Err(e) => tracing::warn!("[Prefs] Settings no longer readable: {}", e),
        }
    }
}

impl eframe::App for PreferencesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_with_store(ctx);

        let mut saved = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            // 1. Tab Bar
            ui.add_space(5.0);
            tab_bar(ui, &mut self.active_tab);
            ui.add_space(5.0);
            ui.separator();
            ui.add_space(10.0);

            // 2. Tab Content
            egui::ScrollArea::vertical().show(ui, |ui| {
                saved = match self.active_tab {
                    SettingsTab::Cavalier => self.cavalier.show(ui, &mut self.store),
                    SettingsTab::Cava => self.cava.show(ui, &mut self.store),
                    SettingsTab::Colors => self.colors.show(ui, &mut self.store),
                };
            });
        });

        if saved {
            self.log_params();
            ctx.request_repaint();
        }

        // Keep polling the file watcher while idle
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::ColorSide;
    use crate::settings::{ColorEntry, SettingValue};

    fn app() -> (egui::Context, PreferencesApp) {
        let ctx = egui::Context::default();
        let app = PreferencesApp::new(&ctx, SettingsStore::in_memory(), None).unwrap();
        (ctx, app)
    }

    #[test]
    fn test_store_changes_reach_controls() {
        let (ctx, mut app) = app();

        app.store.set(Key::Bars, SettingValue::Int(12)).unwrap();
        app.store
            .set(Key::FgColors, SettingValue::Colors(vec![ColorEntry::new(1, 1, 1, 1.0); 3]))
            .unwrap();
        app.sync_with_store(&ctx);

        assert!(app.control_rx.try_recv().is_err());
        assert!(app.color_rx.try_recv().is_err());
        assert_eq!(app.cava.bars_value(), 12.0);
        assert_eq!(app.colors.grid_mut().row_count(ColorSide::Foreground), 3);
    }

    #[test]
    fn test_widget_style_applies_live() {
        let (ctx, mut app) = app();
        assert!(ctx.style().visuals.dark_mode);

        app.store
            .set(Key::WidgetsStyle, SettingValue::Str("light".into()))
            .unwrap();
        app.sync_with_store(&ctx);
        assert!(!ctx.style().visuals.dark_mode);
    }
}
