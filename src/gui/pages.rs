use eframe::egui::{self, Ui};

use crate::binding::{self, BoundControl, SaveValue, BARS_MAX, BARS_MIN, BARS_STEP};
use crate::engine::{Channels, DrawingMode, Smoothing, WidgetStyle};
use crate::gui::color_grid::ColorGrid;
use crate::gui::theme::GRID_SPACING;
use crate::gui::widgets::{
    row_label, BarsControl, ComboControl, RadioControl, SliderControl, SwitchControl,
    TogglePairControl,
};
use crate::settings::{Key, SettingsError, SettingsStore};

type UiControl<'a> = &'a mut dyn BoundControl<Surface = Ui>;

/// One tab of the preferences window
pub trait SettingsPage {
    fn controls_mut(&mut self) -> Vec<UiControl<'_>>;

    /// Draw the page; returns true when anything was saved
    fn show(&mut self, ui: &mut Ui, store: &mut SettingsStore) -> bool;

    fn load_all(&mut self, store: &SettingsStore) -> Result<(), SettingsError> {
        for control in self.controls_mut() {
            let key = control.key();
            control.load(store.get(key))?;
        }
        Ok(())
    }

    /// Refresh every control bound to `key` from the store
    fn reload(&mut self, key: Key, store: &SettingsStore) {
        for control in self.controls_mut() {
            if control.key() != key {
                continue;
            }
            if let Err(e) = control.load(store.get(key)) {
                tracing::warn!("[Prefs] Could not refresh '{}': {}", key, e);
            }
        }
    }
}

/// Draw one control and push its change through the save path
fn bound<C>(ui: &mut Ui, control: &mut C, store: &mut SettingsStore) -> bool
where
    C: BoundControl<Surface = Ui> + ?Sized,
{
    match control.show(ui) {
        Some(value) => commit(control, value, store),
        None => false,
    }
}

/// Save what a control produced. The control is re-read from the store
/// afterwards, so a refused or coerced write shows the value that
/// actually got stored.
fn commit<C>(control: &mut C, value: SaveValue, store: &mut SettingsStore) -> bool
where
    C: BoundControl + ?Sized,
{
    let key = control.key();

    let saved = match binding::save(store, key, value.resolve()) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("[Prefs] Could not save '{}': {}", key, e);
            false
        }
    };
    if let Err(e) = control.load(store.get(key)) {
        tracing::warn!("[Prefs] Could not refresh '{}': {}", key, e);
    }
    saved
}

fn settings_grid(ui: &mut Ui, id: &str, add_rows: impl FnOnce(&mut Ui)) {
    ui.group(|ui| {
        egui::Grid::new(id)
            .num_columns(2)
            .spacing(GRID_SPACING)
            .striped(true)
            .show(ui, add_rows);
    });
}

// =======================================================================================
// CAVALIER
// =======================================================================================

pub struct CavalierPage {
    mode: RadioControl<DrawingMode>,
    margin: SliderControl,
    offset: SliderControl,
    sharp_corners: SwitchControl,
}

impl CavalierPage {
    pub fn new(store: &SettingsStore) -> Result<Self, SettingsError> {
        let mut page = Self {
            mode: RadioControl::new(Key::Mode),
            margin: SliderControl::new(Key::Margin, 0.0..=40.0, 1.0),
            offset: SliderControl::new(Key::ItemsOffset, 0.0..=20.0, 1.0),
            sharp_corners: SwitchControl::new(Key::SharpCorners),
        };
        page.load_all(store)?;
        Ok(page)
    }
}

impl SettingsPage for CavalierPage {
    fn controls_mut(&mut self) -> Vec<UiControl<'_>> {
        vec![
            &mut self.mode,
            &mut self.margin,
            &mut self.offset,
            &mut self.sharp_corners,
        ]
    }

    fn show(&mut self, ui: &mut Ui, store: &mut SettingsStore) -> bool {
        let mut saved = false;

        ui.heading("Cavalier");
        ui.add_space(5.0);
        settings_grid(ui, "cavalier_grid", |ui| {
            row_label(ui, "Drawing Mode", None);
            saved |= bound(ui, &mut self.mode, store);
            ui.end_row();

            row_label(
                ui,
                "Drawing area margin",
                Some("Size of gaps around drawing area (in pixels)."),
            );
            saved |= bound(ui, &mut self.margin, store);
            ui.end_row();

            row_label(
                ui,
                "Offset between items",
                Some("The size of spaces between elements in \"levels\" and \"bars\" modes (in percent)."),
            );
            saved |= bound(ui, &mut self.offset, store);
            ui.end_row();

            row_label(
                ui,
                "Sharp corners",
                Some("Whether the main window corners should be sharp."),
            );
            saved |= bound(ui, &mut self.sharp_corners, store);
            ui.end_row();
        });

        saved
    }
}

// =======================================================================================
// CAVA
// =======================================================================================

pub struct CavaPage {
    bars: BarsControl,
    autosens: SwitchControl,
    sensitivity: SliderControl,
    channels: TogglePairControl<Channels>,
    smoothing: ComboControl<Smoothing>,
    noise_reduction: SliderControl,
}

impl CavaPage {
    pub fn new(store: &SettingsStore) -> Result<Self, SettingsError> {
        let mut page = Self {
            bars: BarsControl::new(BARS_MIN as f64..=BARS_MAX as f64, BARS_STEP as f64),
            autosens: SwitchControl::new(Key::Autosens),
            sensitivity: SliderControl::new(Key::Sensitivity, 10.0..=250.0, 10.0).hide_value(),
            channels: TogglePairControl::new(Key::Channels, [Channels::Mono, Channels::Stereo]),
            smoothing: ComboControl::new(Key::Smoothing),
            noise_reduction: SliderControl::new(Key::NoiseReduction, 0.0..=1.0, 0.01)
                .hint("Recommended: 0.77"),
        };
        page.load_all(store)?;
        Ok(page)
    }
}

#[cfg(test)]
impl CavaPage {
    pub fn bars_value(&self) -> f64 {
        self.bars.value()
    }
}

impl SettingsPage for CavaPage {
    fn controls_mut(&mut self) -> Vec<UiControl<'_>> {
        vec![
            &mut self.bars,
            &mut self.autosens,
            &mut self.sensitivity,
            &mut self.channels,
            &mut self.smoothing,
            &mut self.noise_reduction,
        ]
    }

    fn show(&mut self, ui: &mut Ui, store: &mut SettingsStore) -> bool {
        let mut saved = false;

        ui.heading("CAVA");
        ui.add_space(5.0);
        settings_grid(ui, "cava_grid", |ui| {
            row_label(ui, "Bars", None);
            saved |= bound(ui, &mut self.bars, store);
            ui.end_row();

            row_label(
                ui,
                "Automatic sensitivity",
                Some("Attempt to decrease sensitivity if the bars peak."),
            );
            saved |= bound(ui, &mut self.autosens, store);
            ui.end_row();

            row_label(
                ui,
                "Sensitivity",
                Some("Manual sensitivity. If automatic sensitivity is enabled, this will only be the initial value."),
            );
            saved |= bound(ui, &mut self.sensitivity, store);
            ui.end_row();

            row_label(ui, "Channels", None);
            saved |= bound(ui, &mut self.channels, store);
            ui.end_row();

            row_label(ui, "Smoothing", None);
            saved |= bound(ui, &mut self.smoothing, store);
            ui.end_row();

            row_label(ui, "Noise Reduction", Some("0 - noisy, 1 - smooth"));
            saved |= bound(ui, &mut self.noise_reduction, store);
            ui.end_row();
        });

        saved
    }
}

// =======================================================================================
// COLORS
// =======================================================================================

pub struct ColorsPage {
    style: TogglePairControl<WidgetStyle>,
    grid: ColorGrid,
}

impl ColorsPage {
    pub fn new(store: &SettingsStore) -> Result<Self, SettingsError> {
        let mut page = Self {
            style: TogglePairControl::new(Key::WidgetsStyle, [WidgetStyle::Light, WidgetStyle::Dark]),
            grid: ColorGrid::new(),
        };
        page.load_all(store)?;
        page.grid.build(store)?;
        Ok(page)
    }

    pub fn grid_mut(&mut self) -> &mut ColorGrid {
        &mut self.grid
    }
}

impl SettingsPage for ColorsPage {
    fn controls_mut(&mut self) -> Vec<UiControl<'_>> {
        vec![&mut self.style]
    }

    fn show(&mut self, ui: &mut Ui, store: &mut SettingsStore) -> bool {
        let mut saved = false;

        ui.heading("Colors");
        ui.add_space(5.0);
        settings_grid(ui, "style_grid", |ui| {
            row_label(ui, "Widgets style", Some("Style used by the window's widgets."));
            saved |= bound(ui, &mut self.style, store);
            ui.end_row();
        });

        ui.add_space(10.0);
        saved |= self.grid.show(ui, store);

        ui.add_space(10.0);
        ui.label("Preview");
        self.grid.draw_preview(ui);

        saved
    }
}
