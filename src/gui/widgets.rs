use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, Response, Ui};

use crate::binding::{normalize_bars, BoundControl, RadioGroup, SaveValue, TogglePair};
use crate::engine::Choice;
use crate::gui::SettingsTab;
use crate::gui::theme::{accent, CONTROL_WIDTH, TAB_ROUNDING, TAB_SIZE};
use crate::settings::{Key, SettingValue, SettingsError, ValueKind};

// =======================================================================================
// BOUND CONTROLS
// =======================================================================================

fn mismatch(key: Key, expected: ValueKind, found: &SettingValue) -> SettingsError {
    SettingsError::TypeMismatch {
        key,
        expected,
        found: found.kind(),
    }
}

/// A choice in store form
pub fn choice_value<C: Choice>(choice: C) -> SaveValue {
    SaveValue::Immediate(SettingValue::Str(choice.as_str().to_string()))
}

fn parse_choice<C: Choice>(key: Key, value: &SettingValue) -> Result<C, SettingsError> {
    match value {
        SettingValue::Str(s) => C::parse(s).ok_or_else(|| SettingsError::InvalidChoice {
            key,
            value: s.clone(),
        }),
        other => Err(mismatch(key, ValueKind::Str, other)),
    }
}

/// Horizontal slider over an int or float key
pub struct SliderControl {
    key: Key,
    value: f64,
    range: RangeInclusive<f64>,
    step: f64,
    show_value: bool,
    hint: Option<&'static str>,
}

impl SliderControl {
    pub fn new(key: Key, range: RangeInclusive<f64>, step: f64) -> Self {
        Self {
            key,
            value: *range.start(),
            range,
            step,
            show_value: true,
            hint: None,
        }
    }

    /// No number next to the slider
    pub fn hide_value(mut self) -> Self {
        self.show_value = false;
        self
    }

    pub fn hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    #[cfg(test)]
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl BoundControl for SliderControl {
    type Surface = Ui;

    fn key(&self) -> Key {
        self.key
    }

    fn load(&mut self, value: &SettingValue) -> Result<(), SettingsError> {
        self.value = match value {
            SettingValue::Int(v) => *v as f64,
            SettingValue::Float(v) => *v,
            other => return Err(mismatch(self.key, ValueKind::Float, other)),
        };
        Ok(())
    }

    fn show(&mut self, ui: &mut Ui) -> Option<SaveValue> {
        ui.spacing_mut().slider_width = CONTROL_WIDTH;
        let mut response = ui.add(
            egui::Slider::new(&mut self.value, self.range.clone())
                .step_by(self.step)
                .show_value(self.show_value),
        );
        if let Some(hint) = self.hint {
            response = response.on_hover_text(hint);
        }

        response.changed().then_some(SaveValue::Slider(self.value))
    }
}

/// Bar count slider. Odd positions are pushed down to the even value
/// below, both in the control and in what gets saved.
pub struct BarsControl {
    slider: SliderControl,
}

impl BarsControl {
    pub fn new(range: RangeInclusive<f64>, step: f64) -> Self {
        Self {
            slider: SliderControl::new(Key::Bars, range, step),
        }
    }

    /// Feed a raw slider position through parity normalization
    pub fn apply(&mut self, position: f64) -> SaveValue {
        let bars = normalize_bars(position.round() as i64);
        if bars as f64 != position {
            self.slider.value = bars as f64;
        }
        SaveValue::Immediate(SettingValue::Int(bars))
    }

    #[cfg(test)]
    pub fn value(&self) -> f64 {
        self.slider.value()
    }
}

impl BoundControl for BarsControl {
    type Surface = Ui;

    fn key(&self) -> Key {
        Key::Bars
    }

    fn load(&mut self, value: &SettingValue) -> Result<(), SettingsError> {
        self.slider.load(value)
    }

    fn show(&mut self, ui: &mut Ui) -> Option<SaveValue> {
        match self.slider.show(ui)? {
            SaveValue::Slider(position) => Some(self.apply(position)),
            other => Some(other),
        }
    }
}

/// On/off switch over a bool key
pub struct SwitchControl {
    key: Key,
    on: bool,
}

impl SwitchControl {
    pub fn new(key: Key) -> Self {
        Self { key, on: false }
    }
}

impl BoundControl for SwitchControl {
    type Surface = Ui;

    fn key(&self) -> Key {
        self.key
    }

    fn load(&mut self, value: &SettingValue) -> Result<(), SettingsError> {
        match value {
            SettingValue::Bool(v) => {
                self.on = *v;
                Ok(())
            }
            other => Err(mismatch(self.key, ValueKind::Bool, other)),
        }
    }

    fn show(&mut self, ui: &mut Ui) -> Option<SaveValue> {
        toggle_switch(ui, &mut self.on)
            .changed()
            .then(|| SaveValue::Immediate(SettingValue::Bool(self.on)))
    }
}

/// One radio button per choice, stacked vertically
pub struct RadioControl<C: Choice> {
    key: Key,
    group: RadioGroup<C>,
}

impl<C: Choice> RadioControl<C> {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            group: RadioGroup::new(C::ALL, C::ALL[0]),
        }
    }

    #[cfg(test)]
    pub fn group_mut(&mut self) -> &mut RadioGroup<C> {
        &mut self.group
    }
}

impl<C: Choice> BoundControl for RadioControl<C> {
    type Surface = Ui;

    fn key(&self) -> Key {
        self.key
    }

    fn load(&mut self, value: &SettingValue) -> Result<(), SettingsError> {
        self.group.select(parse_choice(self.key, value)?);
        Ok(())
    }

    fn show(&mut self, ui: &mut Ui) -> Option<SaveValue> {
        let mut activated = None;
        ui.vertical(|ui| {
            for (index, member) in self.group.members().iter().enumerate() {
                if ui.radio(self.group.is_active(index), member.label()).clicked() {
                    activated = self.group.activate(index).or(activated);
                }
            }
        });
        activated.map(choice_value)
    }
}

/// Two linked toggle buttons; pressing one releases the other
pub struct TogglePairControl<C: Choice> {
    key: Key,
    pair: TogglePair<C>,
}

impl<C: Choice> TogglePairControl<C> {
    pub fn new(key: Key, values: [C; 2]) -> Self {
        Self {
            key,
            pair: TogglePair::new(values, values[0]),
        }
    }

    #[cfg(test)]
    pub fn pair_mut(&mut self) -> &mut TogglePair<C> {
        &mut self.pair
    }
}

impl<C: Choice> BoundControl for TogglePairControl<C> {
    type Surface = Ui;

    fn key(&self) -> Key {
        self.key
    }

    fn load(&mut self, value: &SettingValue) -> Result<(), SettingsError> {
        self.pair.select(parse_choice(self.key, value)?);
        Ok(())
    }

    fn show(&mut self, ui: &mut Ui) -> Option<SaveValue> {
        let [first, second] = self.pair.values();
        let mut changed = None;

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            if ui.selectable_label(self.pair.first_active(), first.label()).clicked() {
                changed = self.pair.set_first(true);
            }
            if ui.selectable_label(self.pair.second_active(), second.label()).clicked() {
                changed = self.pair.set_second(true);
            }
        });

        changed.map(choice_value)
    }
}

/// Drop-down over a choice key
pub struct ComboControl<C: Choice> {
    key: Key,
    selected: C,
}

impl<C: Choice> ComboControl<C> {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            selected: C::ALL[0],
        }
    }
}

impl<C: Choice> BoundControl for ComboControl<C> {
    type Surface = Ui;

    fn key(&self) -> Key {
        self.key
    }

    fn load(&mut self, value: &SettingValue) -> Result<(), SettingsError> {
        self.selected = parse_choice(self.key, value)?;
        Ok(())
    }

    fn show(&mut self, ui: &mut Ui) -> Option<SaveValue> {
        let before = self.selected;
        egui::ComboBox::from_id_salt(self.key.as_str())
            .selected_text(self.selected.label())
            .width(CONTROL_WIDTH)
            .show_ui(ui, |ui| {
                for choice in C::ALL {
                    ui.selectable_value(&mut self.selected, *choice, choice.label());
                }
            });

        (self.selected != before).then(|| choice_value(self.selected))
    }
}

// =======================================================================================
// BUILDING BLOCKS
// =======================================================================================

/// iOS-style switch
pub fn toggle_switch(ui: &mut Ui, on: &mut bool) -> Response {
    let desired_size = ui.spacing().interact_size.y * egui::vec2(2.0, 1.0);
    let (rect, mut response) = ui.allocate_exact_size(desired_size, egui::Sense::click());

    if response.clicked() {
        *on = !*on;
        response.mark_changed();
    }

    if ui.is_rect_visible(rect) {
        let how_on = ui.ctx().animate_bool(response.id, *on);
        let visuals = ui.style().interact_selectable(&response, *on);
        let rect = rect.expand(visuals.expansion);
        let radius = 0.5 * rect.height();

        ui.painter().rect(rect, radius, visuals.bg_fill, visuals.bg_stroke);

        // Knob slides from left (off) to right (on)
        let circle_x = egui::lerp((rect.left() + radius)..=(rect.right() - radius), how_on);
        let center = egui::pos2(circle_x, rect.center().y);
        ui.painter().circle(center, 0.75 * radius, visuals.bg_fill, visuals.fg_stroke);
    }

    response
}

/// Left column of a settings row: title, optional dimmed subtitle
pub fn row_label(ui: &mut Ui, title: &str, subtitle: Option<&str>) {
    ui.vertical(|ui| {
        ui.label(title);
        if let Some(subtitle) = subtitle {
            ui.add(egui::Label::new(egui::RichText::new(subtitle).small().weak()).wrap());
        }
    });
}

/// Row of pill-shaped tab buttons; the selected one is filled with the
/// theme accent.
pub fn tab_bar(ui: &mut Ui, active_tab: &mut SettingsTab) {
    let accent = accent(ui.ctx());

    ui.horizontal(|ui| {
        for tab in SettingsTab::ALL {
            let selected = *active_tab == tab;
            let text = egui::RichText::new(tab.label()).size(14.0);
            let text = if selected {
                text.color(ui.visuals().selection.stroke.color)
            } else {
                text
            };

            let response = ui.add(
                egui::Button::new(text)
                    .fill(if selected { accent } else { Color32::TRANSPARENT })
                    .frame(selected)
                    .rounding(TAB_ROUNDING)
                    .min_size(TAB_SIZE),
            );
            if response.clicked() && !selected {
                tracing::debug!("[Prefs] Tab: {}", tab.label());
                *active_tab = tab;
            }
            if response.hovered() && !selected {
                let hover = ui.visuals().widgets.hovered.bg_fill.linear_multiply(0.2);
                ui.painter().rect_filled(response.rect, TAB_ROUNDING, hover);
            }
        }
    });
}
