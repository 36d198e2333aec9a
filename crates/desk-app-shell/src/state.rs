//! Opaque saved-state bundle handed to and from the lifecycle layer.

use desk_core::collections::map::HashMap;

pub const CURRENT_SCREEN: &str = "desk.current_screen";
pub const OPEN_FOLDERS: &str = "desk.open_folders";
pub const ALL_ITEMS_OPEN: &str = "desk.all_items";
pub const QUICK_ACCESS_OPEN: &str = "desk.quick_access";
pub const PENDING_ADD_SCREEN: &str = "desk.add_screen";
pub const PENDING_ADD_CELL_X: &str = "desk.add_cell_x";
pub const PENDING_ADD_CELL_Y: &str = "desk.add_cell_y";
pub const PENDING_ADD_SPAN_X: &str = "desk.add_span_x";
pub const PENDING_ADD_SPAN_Y: &str = "desk.add_span_y";
pub const PENDING_ADD_COUNT_X: &str = "desk.add_count_x";
pub const PENDING_ADD_COUNT_Y: &str = "desk.add_count_y";
pub const PENDING_ADD_OCCUPIED: &str = "desk.add_occupied_cells";
pub const PENDING_FOLDER_RENAME: &str = "desk.rename_folder";
pub const PENDING_FOLDER_RENAME_ID: &str = "desk.rename_folder_id";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateValue {
    Int(u64),
    Bool(bool),
    Ids(Vec<u64>),
    Mask(Vec<bool>),
}

/// Key/value data that outlives the shell. The shell writes it in
/// [`save_state`](crate::DesktopShell::save_state) and reads it once in
/// [`restore_state`](crate::DesktopShell::restore_state).
#[derive(Clone, Debug, Default)]
pub struct StateBundle {
    values: HashMap<String, StateValue>,
}

impl StateBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &str, value: StateValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn put_int(&mut self, key: &str, value: u64) {
        self.put(key, StateValue::Int(value));
    }

    pub fn put_bool(&mut self, key: &str, value: bool) {
        self.put(key, StateValue::Bool(value));
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    pub fn int(&self, key: &str) -> Option<u64> {
        match self.get(key) {
            Some(StateValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Index-like value; `None` if absent or not representable.
    pub fn index(&self, key: &str) -> Option<usize> {
        self.int(key).and_then(|value| usize::try_from(value).ok())
    }

    /// Missing flags read as false.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.get(key), Some(StateValue::Bool(true)))
    }

    pub fn ids(&self, key: &str) -> Option<&[u64]> {
        match self.get(key) {
            Some(StateValue::Ids(ids)) => Some(ids),
            _ => None,
        }
    }

    pub fn mask(&self, key: &str) -> Option<&[bool]> {
        match self.get(key) {
            Some(StateValue::Mask(mask)) => Some(mask),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads_reject_other_kinds() {
        let mut bundle = StateBundle::new();
        bundle.put_int(CURRENT_SCREEN, 3);
        bundle.put_bool(ALL_ITEMS_OPEN, true);
        bundle.put(OPEN_FOLDERS, StateValue::Ids(vec![4, 9]));

        assert_eq!(bundle.index(CURRENT_SCREEN), Some(3));
        assert!(bundle.flag(ALL_ITEMS_OPEN));
        assert!(!bundle.flag(QUICK_ACCESS_OPEN));
        assert!(!bundle.flag(CURRENT_SCREEN));
        assert_eq!(bundle.int(ALL_ITEMS_OPEN), None);
        assert_eq!(bundle.ids(OPEN_FOLDERS), Some(&[4, 9][..]));
        assert_eq!(bundle.mask(OPEN_FOLDERS), None);
        assert_eq!(bundle.len(), 3);
    }
}
