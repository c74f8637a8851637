//! In-place edits of locally cached entity lists.

use marquee_api_models::{EntityId, Event, Marquee, Service};

/// A server document with a stable identifier.
pub trait Entity {
    /// Backend identifier.
    fn entity_id(&self) -> &EntityId;
}

impl Entity for Marquee {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for Event {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

impl Entity for Service {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

/// Replace the entry sharing `updated`'s id, keeping its position.
///
/// Later entries with the same id are dropped so the list never holds
/// duplicates. Returns `false`, leaving the list untouched, when no entry
/// matches.
pub fn replace_entity<T: Entity>(items: &mut Vec<T>, updated: T) -> bool {
    let Some(position) = items
        .iter()
        .position(|item| item.entity_id() == updated.entity_id())
    else {
        return false;
    };
    let id = updated.entity_id().clone();
    let mut index = 0;
    items.retain(|item| {
        let keep = index <= position || item.entity_id() != &id;
        index += 1;
        keep
    });
    items[position] = updated;
    true
}

/// Remove every entry with `id`; returns how many were removed.
pub fn remove_entity<T: Entity>(items: &mut Vec<T>, id: &EntityId) -> usize {
    let before = items.len();
    items.retain(|item| item.entity_id() != id);
    before - items.len()
}
