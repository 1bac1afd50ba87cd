use crate::{
    broadcast::Stage,
    types::{EventKind, EventMask},
};

/// Drops every event kind set in its mask and forwards the rest unchanged.
pub struct Blocker {
    mask: EventMask,
    dropped: [u64; EventKind::COUNT],
}

impl Blocker {
    pub fn new(mask: EventMask) -> Self {
        Self {
            mask,
            dropped: [0; EventKind::COUNT],
        }
    }

    pub fn mask(&self) -> EventMask {
        self.mask
    }

    pub fn dropped(&self, kind: EventKind) -> u64 {
        self.dropped[kind.index()]
    }

    pub fn dropped_total(&self) -> u64 {
        self.dropped.iter().sum()
    }
}

impl Stage for Blocker {
    fn blocks(&mut self, kind: EventKind) -> bool {
        if !self.mask.contains(kind) {
            return false;
        }
        let slot = &mut self.dropped[kind.index()];
        *slot = slot.saturating_add(1);
        true
    }
}
