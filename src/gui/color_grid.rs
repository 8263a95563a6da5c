use eframe::egui::{self, Ui};
use eframe::egui::epaint::{Mesh, Vertex};

use crate::colors::{ColorLists, ColorSide};
use crate::gui::theme::{to_egui_color, SWATCH_SIZE};
use crate::settings::{ColorEntry, SettingsError, SettingsStore};

/// Picker state for one swatch.
///
/// egui's picker works in 0-255 sRGB, the store keeps alpha as a float.
/// `alpha` remembers the stored value so editing only RGB doesn't
/// quantize it.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Swatch {
    srgba: [u8; 4],
    alpha: f32,
}

impl Swatch {
    /// Initial value of the add pickers
    const OPAQUE_BLACK: Swatch = Swatch {
        srgba: [0, 0, 0, 255],
        alpha: 1.0,
    };

    fn from_entry(entry: ColorEntry) -> Self {
        Self {
            srgba: [entry.r, entry.g, entry.b, alpha_byte(entry.a)],
            alpha: entry.a,
        }
    }

    /// Unit RGBA, as the color list editor expects it
    fn unit_rgba(&self) -> [f32; 4] {
        let [r, g, b, a] = self.srgba;
        let alpha = if a == alpha_byte(self.alpha) {
            self.alpha
        } else {
            a as f32 / 255.0
        };
        [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, alpha]
    }
}

fn alpha_byte(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// What the user did this frame; applied after the grid is drawn
#[derive(Clone, Copy, Debug, PartialEq)]
enum GridAction {
    Edit(ColorSide, usize, [f32; 4]),
    Remove(ColorSide, usize),
    Add(ColorSide, [f32; 4]),
}

/// Two-column grid (foreground | background) over the color lists:
/// one row per color, then an "Add" row while the list has room.
pub struct ColorGrid {
    /// Set once the rows exist. Rebuild requests before that are dropped.
    ready: bool,

    lists: Option<ColorLists>,

    fg_rows: Vec<Swatch>,
    bg_rows: Vec<Swatch>,

    /// Pending color for each side's add picker
    fg_add: Swatch,
    bg_add: Swatch,
}

impl ColorGrid {
    pub fn new() -> Self {
        Self {
            ready: false,
            lists: None,
            fg_rows: Vec::new(),
            bg_rows: Vec::new(),
            fg_add: Swatch::OPAQUE_BLACK,
            bg_add: Swatch::OPAQUE_BLACK,
        }
    }

    #[cfg(test)]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Read both lists from the store and regenerate every row
    pub fn build(&mut self, store: &SettingsStore) -> Result<(), SettingsError> {
        let lists = ColorLists::load(store)?;
        self.fill_rows(&lists);
        self.lists = Some(lists);
        self.ready = true;
        Ok(())
    }

    /// Rebuild after the color keys changed in the store.
    /// Ignored until the first [`build`](Self::build).
    pub fn request_rebuild(&mut self, store: &SettingsStore) {
        if !self.ready {
            tracing::trace!("[Colors] Rebuild requested before the grid exists, skipping");
            return;
        }
        if let Err(e) = self.build(store) {
            tracing::warn!("[Colors] Could not rebuild color grid: {}", e);
        }
    }

    fn fill_rows(&mut self, lists: &ColorLists) {
        self.fg_rows = swatches(lists.get(ColorSide::Foreground));
        self.bg_rows = swatches(lists.get(ColorSide::Background));
    }

    #[cfg(test)]
    pub fn row_count(&self, side: ColorSide) -> usize {
        match side {
            ColorSide::Foreground => self.fg_rows.len(),
            ColorSide::Background => self.bg_rows.len(),
        }
    }

    fn rows_mut(&mut self, side: ColorSide) -> &mut Vec<Swatch> {
        match side {
            ColorSide::Foreground => &mut self.fg_rows,
            ColorSide::Background => &mut self.bg_rows,
        }
    }

    /// Draw the grid; returns true when something was saved
    pub fn show(&mut self, ui: &mut Ui, store: &mut SettingsStore) -> bool {
        let Some(lists) = self.lists.clone() else {
            return false;
        };

        let mut actions = Vec::new();
        let row_count = ColorSide::BOTH
            .iter()
            .map(|&side| lists.get(side).len() + usize::from(lists.can_add(side)))
            .max()
            .unwrap_or(0);

        egui::Frame::group(ui.style()).show(ui, |ui| {
            egui::Grid::new("colors_grid")
                .num_columns(2)
                .min_col_width(ui.available_width() / 2.0 - 8.0)
                .spacing(egui::vec2(8.0, 6.0))
                .show(ui, |ui| {
                    for side in ColorSide::BOTH {
                        ui.vertical_centered(|ui| ui.strong(side.label()));
                    }
                    ui.end_row();

                    for row in 0..row_count {
                        for side in ColorSide::BOTH {
                            ui.vertical_centered(|ui| {
                                self.show_cell(ui, &lists, side, row, &mut actions);
                            });
                        }
                        ui.end_row();
                    }
                });
        });

        self.apply(store, actions)
    }

    fn show_cell(
        &mut self,
        ui: &mut Ui,
        lists: &ColorLists,
        side: ColorSide,
        row: usize,
        actions: &mut Vec<GridAction>,
    ) {
        let len = lists.get(side).len();

        if row < len {
            ui.horizontal(|ui| {
                let swatch = &mut self.rows_mut(side)[row];
                ui.spacing_mut().interact_size = SWATCH_SIZE;
                if ui.color_edit_button_srgba_unmultiplied(&mut swatch.srgba).changed() {
                    actions.push(GridAction::Edit(side, row, swatch.unit_rgba()));
                }

                let remove = ui
                    .add_enabled(lists.can_remove(side, row), egui::Button::new("🗑"))
                    .on_hover_text("Remove");
                if remove.clicked() {
                    actions.push(GridAction::Remove(side, row));
                }
            });
        } else if row == len && lists.can_add(side) {
            ui.horizontal(|ui| {
                ui.label("Add");
                let swatch = match side {
                    ColorSide::Foreground => &mut self.fg_add,
                    ColorSide::Background => &mut self.bg_add,
                };
                ui.color_edit_button_srgba_unmultiplied(&mut swatch.srgba);
                if ui.button("➕").on_hover_text("Add color").clicked() {
                    actions.push(GridAction::Add(side, swatch.unit_rgba()));
                }
            });
        }
    }

    /// Apply this frame's actions, then rebuild once
    fn apply(&mut self, store: &mut SettingsStore, actions: Vec<GridAction>) -> bool {
        if actions.is_empty() {
            return false;
        }
        let Some(lists) = self.lists.as_mut() else {
            return false;
        };

        let mut saved = false;
        for action in actions {
            let result = match action {
                GridAction::Edit(side, index, rgba) => lists.edit(store, side, index, rgba).map(|_| ()),
                GridAction::Remove(side, index) => lists.remove(store, side, index).map(|_| ()),
                GridAction::Add(side, rgba) => lists.append(store, side, rgba).map(|_| ()),
            };
            match result {
                Ok(()) => saved = true,
                Err(e) => tracing::warn!("[Colors] {:?} refused: {}", action, e),
            }
        }

        let lists = lists.clone();
        self.fill_rows(&lists);
        saved
    }

    /// Strip showing the foreground colors over the first background color
    pub fn draw_preview(&self, ui: &mut Ui) {
        let Some(lists) = &self.lists else {
            return;
        };

        let rect = ui.available_rect_before_wrap();
        let preview_rect = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), 30.0));
        ui.allocate_rect(preview_rect, egui::Sense::hover());

        let painter = ui.painter();
        if let Some(bg) = lists.get(ColorSide::Background).first() {
            painter.rect_filled(preview_rect, 4.0, to_egui_color(*bg));
        }

        // Gradient through the foreground colors, in layer order
        let fg = lists.get(ColorSide::Foreground);
        if fg.is_empty() {
            return;
        }
        if fg.len() == 1 {
            painter.rect_filled(preview_rect.shrink(6.0), 2.0, to_egui_color(fg[0]));
            return;
        }

        let inner = preview_rect.shrink(6.0);
        let mut mesh = Mesh::default();
        for (i, color) in fg.iter().enumerate() {
            let t = i as f32 / (fg.len() - 1) as f32;
            let x = egui::lerp(inner.left()..=inner.right(), t);
            let color = to_egui_color(*color);
            mesh.vertices.push(Vertex { pos: egui::pos2(x, inner.bottom()), uv: egui::Pos2::ZERO, color });
            mesh.vertices.push(Vertex { pos: egui::pos2(x, inner.top()), uv: egui::Pos2::ZERO, color });
        }
        for i in 0..(fg.len() as u32 - 1) {
            let base = i * 2;
            mesh.add_triangle(base, base + 2, base + 3);
            mesh.add_triangle(base, base + 3, base + 1);
        }
        painter.add(egui::Shape::mesh(mesh));
    }
}

impl Default for ColorGrid {
    fn default() -> Self {
        Self::new()
    }
}

fn swatches(entries: &[ColorEntry]) -> Vec<Swatch> {
    entries.iter().copied().map(Swatch::from_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Key, SettingValue};

    #[test]
    fn test_rebuild_before_build_is_ignored() {
        let store = SettingsStore::in_memory();
        let mut grid = ColorGrid::new();

        grid.request_rebuild(&store);
        assert!(!grid.is_ready());
        assert!(grid.fg_rows.is_empty());

        grid.build(&store).unwrap();
        assert!(grid.is_ready());
        assert_eq!(grid.fg_rows.len(), 1);
    }

    #[test]
    fn test_rebuild_follows_store() {
        let mut store = SettingsStore::in_memory();
        let mut grid = ColorGrid::new();
        grid.build(&store).unwrap();

        store
            .set(
                Key::BgColors,
                SettingValue::Colors(vec![
                    ColorEntry::new(1, 2, 3, 1.0),
                    ColorEntry::new(4, 5, 6, 0.5),
                ]),
            )
            .unwrap();
        grid.request_rebuild(&store);

        assert_eq!(grid.bg_rows.len(), 2);
        assert_eq!(grid.bg_rows[1].srgba, [4, 5, 6, 128]);
    }

    #[test]
    fn test_actions_apply_then_rows_rebuild() {
        let mut store = SettingsStore::in_memory();
        store
            .set(Key::FgColors, SettingValue::Colors(vec![ColorEntry::new(0, 0, 0, 1.0)]))
            .unwrap();
        let mut grid = ColorGrid::new();
        grid.build(&store).unwrap();

        let saved = grid.apply(
            &mut store,
            vec![
                GridAction::Add(ColorSide::Foreground, [1.0, 0.0, 0.0, 0.5]),
                GridAction::Remove(ColorSide::Foreground, 0),
            ],
        );

        assert!(saved);
        assert_eq!(
            store.get_colors(Key::FgColors).unwrap(),
            &[ColorEntry::new(255, 0, 0, 0.5)]
        );
        assert_eq!(grid.fg_rows, vec![Swatch::from_entry(ColorEntry::new(255, 0, 0, 0.5))]);
    }

    #[test]
    fn test_refused_action_saves_nothing() {
        let mut store = SettingsStore::in_memory();
        let mut grid = ColorGrid::new();
        grid.build(&store).unwrap();

        let saved = grid.apply(&mut store, vec![GridAction::Remove(ColorSide::Foreground, 0)]);
        assert!(!saved);
        assert_eq!(store.get_colors(Key::FgColors).unwrap().len(), 1);
    }

    #[test]
    fn test_swatch_keeps_precise_alpha_when_untouched() {
        let swatch = Swatch::from_entry(ColorEntry::new(10, 20, 30, 0.3));
        assert_eq!(swatch.unit_rgba()[3], 0.3);

        let mut moved = swatch;
        moved.srgba[3] = 255;
        assert_eq!(moved.unit_rgba()[3], 1.0);
    }
}
