//! Global input listener bookkeeping.
//!
//! The host owns one registry standing in for the window's listener
//! lists. Each component that registers at mount keeps its ids and hands
//! them back at teardown, so a leaked listener shows up as a non-empty
//! registry.

use std::collections::BTreeMap;

use frameintro_model::event::InputKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u64,
    active: BTreeMap<ListenerId, InputKind>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: InputKind) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.active.insert(id, kind);
        tracing::trace!(?kind, ?id, "listener registered");
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let removed = self.active.remove(&id);
        if let Some(kind) = removed {
            tracing::trace!(?kind, ?id, "listener removed");
        }
        removed.is_some()
    }

    /// Whether any listener of `kind` is registered.
    pub fn is_listening(&self, kind: InputKind) -> bool {
        self.active.values().any(|k| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
