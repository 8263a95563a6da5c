//! Single-selection control groups

/// N-way radio group: exactly one member is active at any time
#[derive(Clone, Debug)]
pub struct RadioGroup<T: Copy + PartialEq + 'static> {
    members: &'static [T],
    active: usize,
}

impl<T: Copy + PartialEq + 'static> RadioGroup<T> {
    /// Group with `current` active. An unknown value activates the first member.
    ///
    /// `members` must not be empty.
    pub fn new(members: &'static [T], current: T) -> Self {
        debug_assert!(!members.is_empty());
        let active = members.iter().position(|m| *m == current).unwrap_or(0);
        Self { members, active }
    }

    pub fn members(&self) -> &'static [T] {
        self.members
    }

    pub fn active(&self) -> T {
        self.members[self.active]
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == index
    }

    /// User activated member `index`.
    ///
    /// Returns the newly active value exactly once; re-activating the
    /// current member (or an index out of range) reports nothing.
    pub fn activate(&mut self, index: usize) -> Option<T> {
        if index >= self.members.len() || index == self.active {
            return None;
        }
        self.active = index;
        Some(self.members[index])
    }

    /// Follow a stored value without reporting a change
    pub fn select(&mut self, value: T) {
        if let Some(index) = self.members.iter().position(|m| *m == value) {
            self.active = index;
        }
    }
}

/// Two toggles that always hold opposite states.
///
/// Only the first toggle decides the stored value; the second is its
/// complement by construction.
#[derive(Clone, Debug)]
pub struct TogglePair<T: Copy + PartialEq> {
    values: [T; 2],
    first_active: bool,
}

impl<T: Copy + PartialEq> TogglePair<T> {
    /// `current` matching neither value activates the second toggle
    pub fn new(values: [T; 2], current: T) -> Self {
        Self {
            values,
            first_active: current == values[0],
        }
    }

    pub fn values(&self) -> [T; 2] {
        self.values
    }

    pub fn first_active(&self) -> bool {
        self.first_active
    }

    pub fn second_active(&self) -> bool {
        !self.first_active
    }

    /// Value the pair currently stands for
    pub fn value(&self) -> T {
        if self.first_active {
            self.values[0]
        } else {
            self.values[1]
        }
    }

    /// Set the first toggle (and the second to the opposite).
    /// Returns the new value when it changed.
    pub fn set_first(&mut self, active: bool) -> Option<T> {
        if self.first_active == active {
            return None;
        }
        self.first_active = active;
        Some(self.value())
    }

    pub fn set_second(&mut self, active: bool) -> Option<T> {
        self.set_first(!active)
    }

    /// Follow a stored value without reporting a change
    pub fn select(&mut self, value: T) {
        self.first_active = value == self.values[0];
    }
}
