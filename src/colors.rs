use std::fmt;

use crate::settings::{ColorEntry, Key, SettingValue, SettingsError, SettingsStore};

/// Most entries a list may hold; the add row disappears at this size
pub const MAX_COLORS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorSide {
    Foreground,
    Background,
}

impl ColorSide {
    pub const BOTH: [ColorSide; 2] = [ColorSide::Foreground, ColorSide::Background];

    pub fn key(self) -> Key {
        match self {
            ColorSide::Foreground => Key::FgColors,
            ColorSide::Background => Key::BgColors,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorSide::Foreground => "Foreground",
            ColorSide::Background => "Background",
        }
    }
}

impl fmt::Display for ColorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ColorListError {
    #[error("the foreground needs at least one color")]
    ReservedEntry,

    #[error("no {side} color at index {index} (list has {len})")]
    IndexOutOfRange {
        side: ColorSide,
        index: usize,
        len: usize,
    },

    #[error("{side} already has {max} colors", max = MAX_COLORS)]
    ListFull { side: ColorSide },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Foreground and background color lists, in layer order.
///
/// Every mutation writes the whole list back to the store before the
/// local copy changes, so a failed write leaves both untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorLists {
    fg: Vec<ColorEntry>,
    bg: Vec<ColorEntry>,
}

impl ColorLists {
    pub fn load(store: &SettingsStore) -> Result<Self, SettingsError> {
        Ok(Self {
            fg: store.get_colors(Key::FgColors)?.to_vec(),
            bg: store.get_colors(Key::BgColors)?.to_vec(),
        })
    }

    pub fn get(&self, side: ColorSide) -> &[ColorEntry] {
        match side {
            ColorSide::Foreground => &self.fg,
            ColorSide::Background => &self.bg,
        }
    }

    fn get_mut(&mut self, side: ColorSide) -> &mut Vec<ColorEntry> {
        match side {
            ColorSide::Foreground => &mut self.fg,
            ColorSide::Background => &mut self.bg,
        }
    }

    pub fn can_add(&self, side: ColorSide) -> bool {
        self.get(side).len() < MAX_COLORS
    }

    /// Whether the remove button for `index` should be enabled.
    /// The last remaining foreground color can't go.
    pub fn can_remove(&self, side: ColorSide, index: usize) -> bool {
        let len = self.get(side).len();
        index < len && !(side == ColorSide::Foreground && len == 1)
    }

    /// Append the picker's color (unit RGBA) to the end of `side`
    pub fn append(
        &mut self,
        store: &mut SettingsStore,
        side: ColorSide,
        rgba: [f32; 4],
    ) -> Result<ColorEntry, ColorListError> {
        if !self.can_add(side) {
            return Err(ColorListError::ListFull { side });
        }

        let entry = ColorEntry::from_unit_rgba(rgba);
        let mut list = self.get(side).to_vec();
        list.push(entry);
        self.commit(store, side, list)?;

        tracing::info!("[Colors] Added {} color {:?}", side, entry);
        Ok(entry)
    }

    pub fn remove(
        &mut self,
        store: &mut SettingsStore,
        side: ColorSide,
        index: usize,
    ) -> Result<ColorEntry, ColorListError> {
        self.check_index(side, index)?;
        if !self.can_remove(side, index) {
            return Err(ColorListError::ReservedEntry);
        }

        let mut list = self.get(side).to_vec();
        let removed = list.remove(index);
        self.commit(store, side, list)?;

        tracing::info!("[Colors] Removed {} color #{}", side, index);
        Ok(removed)
    }

    /// Replace the color at `index` (remove, then insert at the same spot)
    pub fn edit(
        &mut self,
        store: &mut SettingsStore,
        side: ColorSide,
        index: usize,
        rgba: [f32; 4],
    ) -> Result<ColorEntry, ColorListError> {
        self.check_index(side, index)?;

        let entry = ColorEntry::from_unit_rgba(rgba);
        let mut list = self.get(side).to_vec();
        list.remove(index);
        list.insert(index, entry);
        self.commit(store, side, list)?;

        tracing::debug!("[Colors] {} color #{} -> {:?}", side, index, entry);
        Ok(entry)
    }

    fn check_index(&self, side: ColorSide, index: usize) -> Result<(), ColorListError> {
        let len = self.get(side).len();
        if index >= len {
            return Err(ColorListError::IndexOutOfRange { side, index, len });
        }
        Ok(())
    }

    fn commit(
        &mut self,
        store: &mut SettingsStore,
        side: ColorSide,
        list: Vec<ColorEntry>,
    ) -> Result<(), ColorListError> {
        store.set(side.key(), SettingValue::Colors(list.clone()))?;
        *self.get_mut(side) = list;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: ColorEntry = ColorEntry::new(0, 0, 0, 1.0);

    fn store_with(fg: Vec<ColorEntry>, bg: Vec<ColorEntry>) -> SettingsStore {
        let mut store = SettingsStore::in_memory();
        store.set(Key::FgColors, SettingValue::Colors(fg)).unwrap();
        store.set(Key::BgColors, SettingValue::Colors(bg)).unwrap();
        store
    }

    #[test]
    fn test_append_grows_by_one_with_converted_color() {
        let mut store = store_with(vec![BLACK], vec![]);
        let mut lists = ColorLists::load(&store).unwrap();

        let added = lists
            .append(&mut store, ColorSide::Foreground, [0.2, 0.6, 1.0, 0.3])
            .unwrap();

        assert_eq!(added, ColorEntry::new(51, 153, 255, 0.3));
        assert_eq!(lists.get(ColorSide::Foreground), &[BLACK, added]);
        assert_eq!(store.get_colors(Key::FgColors).unwrap(), &[BLACK, added]);
    }

    #[test]
    fn test_only_foreground_color_cannot_be_removed() {
        let mut store = store_with(vec![BLACK], vec![BLACK]);
        let mut lists = ColorLists::load(&store).unwrap();

        assert!(!lists.can_remove(ColorSide::Foreground, 0));
        assert!(matches!(
            lists.remove(&mut store, ColorSide::Foreground, 0),
            Err(ColorListError::ReservedEntry)
        ));
        assert_eq!(lists.get(ColorSide::Foreground).len(), 1);

        // Background may become empty
        assert!(lists.can_remove(ColorSide::Background, 0));
        lists.remove(&mut store, ColorSide::Background, 0).unwrap();
        assert!(lists.get(ColorSide::Background).is_empty());
        assert!(store.get_colors(Key::BgColors).unwrap().is_empty());
    }

    #[test]
    fn test_append_then_remove_first_foreground() {
        let mut store = store_with(vec![BLACK], vec![]);
        let mut lists = ColorLists::load(&store).unwrap();

        lists
            .append(&mut store, ColorSide::Foreground, [1.0, 0.0, 0.0, 0.5])
            .unwrap();
        assert_eq!(
            lists.get(ColorSide::Foreground),
            &[BLACK, ColorEntry::new(255, 0, 0, 0.5)]
        );

        // Two entries now, so the first one may go
        assert!(lists.can_remove(ColorSide::Foreground, 0));
        lists.remove(&mut store, ColorSide::Foreground, 0).unwrap();
        assert_eq!(
            store.get_colors(Key::FgColors).unwrap(),
            &[ColorEntry::new(255, 0, 0, 0.5)]
        );
    }

    #[test]
    fn test_edit_replaces_only_that_entry() {
        let red = ColorEntry::new(255, 0, 0, 1.0);
        let green = ColorEntry::new(0, 255, 0, 1.0);
        let blue = ColorEntry::new(0, 0, 255, 1.0);
        let mut store = store_with(vec![red, green, blue], vec![]);
        let mut lists = ColorLists::load(&store).unwrap();

        let edited = lists
            .edit(&mut store, ColorSide::Foreground, 1, [1.0, 1.0, 1.0, 0.75])
            .unwrap();

        assert_eq!(
            lists.get(ColorSide::Foreground),
            &[red, ColorEntry::new(255, 255, 255, 0.75), blue]
        );
        assert_eq!(edited, ColorEntry::new(255, 255, 255, 0.75));
        assert_eq!(store.get_colors(Key::FgColors).unwrap().len(), 3);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut store = store_with(vec![BLACK], vec![]);
        let mut lists = ColorLists::load(&store).unwrap();

        assert!(matches!(
            lists.edit(&mut store, ColorSide::Background, 0, [0.0; 4]),
            Err(ColorListError::IndexOutOfRange { index: 0, len: 0, .. })
        ));
        assert!(!lists.can_remove(ColorSide::Foreground, 3));
    }

    #[test]
    fn test_full_list_refuses_append() {
        let mut store = store_with(vec![BLACK; MAX_COLORS], vec![]);
        let mut lists = ColorLists::load(&store).unwrap();

        assert!(!lists.can_add(ColorSide::Foreground));
        assert!(matches!(
            lists.append(&mut store, ColorSide::Foreground, [0.0, 0.0, 0.0, 1.0]),
            Err(ColorListError::ListFull { side: ColorSide::Foreground })
        ));
        assert_eq!(store.get_colors(Key::FgColors).unwrap().len(), MAX_COLORS);
    }
}
