//! Mutation recording.
//!
//! Every structural or text change made through `Document` produces one
//! `MutationRecord`. Records are queued per registered observer whose init
//! matches, and drained with `Document::take_records`. Delivery timing is the
//! caller's business: the overflow monitor drains queues when it is polled,
//! which plays the role of the platform's microtask checkpoint.

use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationObserverId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    ChildList,
    CharacterData,
    Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
}

/// Which mutations an observer wants. Mirrors the platform's observer init dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub subtree: bool,
    pub character_data: bool,
    pub attributes: bool,
}

impl MutationObserverInit {
    /// Child list, subtree and character data: the set used to watch rendered text.
    pub const fn text_content() -> Self {
        Self {
            child_list: true,
            subtree: true,
            character_data: true,
            attributes: false,
        }
    }

    pub fn accepts(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes => self.attributes,
        }
    }
}

#[derive(Debug)]
pub(crate) struct ObserverSlot {
    pub target: NodeId,
    pub init: MutationObserverInit,
    pub queue: Vec<MutationRecord>,
}
