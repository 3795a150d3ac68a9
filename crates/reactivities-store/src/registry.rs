//! Keyed cache of activities.

use indexmap::IndexMap;
use reactivities_shared::Activity;

/// Maps activity id to activity. Every key equals its value's `id`, which is
/// why writes take the activity alone and derive the key from it.
///
/// Iteration follows insertion order. Overwriting keeps an entry's position;
/// deleting keeps the relative order of the rest.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entries: IndexMap<String, Activity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the entry, or `None` when the id is unknown.
    pub fn get(&self, id: &str) -> Option<Activity> {
        self.entries.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert or overwrite the entry keyed by `activity.id`.
    pub fn set(&mut self, activity: Activity) {
        self.entries.insert(activity.id.clone(), activity);
    }

    /// Remove the entry if present. Removing an unknown id does nothing.
    pub fn delete(&mut self, id: &str) {
        self.entries.shift_remove(id);
    }

    /// Entries in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Activity> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
