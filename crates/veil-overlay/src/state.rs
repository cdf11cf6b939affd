#![forbid(unsafe_code)]

//! Per-instance lifecycle state.
//!
//! Every overlay root that has been initialized gets one slot in the
//! [`InstanceArena`]. The slot owns the lifecycle phase, the state flags, and
//! the transition generation; the flags are mirrored onto the root as data
//! attributes after every change so CSS can follow along.
//!
//! # Invariants
//!
//! - One instance per root element; `by_root` and `slots` agree.
//! - The root's `data-isopen`/`-isshowing`/`-ishiding`/`-islocked` markers
//!   equal `flags` after every engine call returns.
//! - `generation` increases on every accepted show or hide; a pending
//!   completion carrying an older generation is stale.

use std::fmt;

use ahash::AHashMap;
use bitflags::bitflags;
use veil_core::{Document, NodeId};

use crate::markup::{IS_HIDING, IS_LOCKED, IS_OPEN, IS_SHOWING};
use crate::options::OverlayOptions;
use crate::status::OverlayStatus;

/// Identifier for an instance slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u32);

impl InstanceId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay-{}", self.0)
    }
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Closed,
    Opening,
    Open,
    Closing,
}

impl Phase {
    /// Opening or open.
    #[inline]
    pub const fn is_shown(self) -> bool {
        matches!(self, Self::Opening | Self::Open)
    }
}

bitflags! {
    /// State flags mirrored to the root's data attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StateFlags: u8 {
        const OPEN = 0b0001;
        const SHOWING = 0b0010;
        const HIDING = 0b0100;
        const LOCKED = 0b1000;
    }
}

impl StateFlags {
    const MARKERS: [(Self, &'static str); 4] = [
        (Self::OPEN, IS_OPEN),
        (Self::SHOWING, IS_SHOWING),
        (Self::HIDING, IS_HIDING),
        (Self::LOCKED, IS_LOCKED),
    ];

    /// Write the flags onto `root` as `data-*` markers.
    pub fn sync_to(self, doc: &mut Document, root: NodeId) {
        for (flag, key) in Self::MARKERS {
            if self.contains(flag) {
                if !doc.has_data(root, key) {
                    doc.set_data(root, key, "");
                }
            } else {
                doc.remove_data(root, key);
            }
        }
    }

    /// Read the markers present on `root`.
    pub fn read_from(doc: &Document, root: NodeId) -> Self {
        Self::MARKERS
            .iter()
            .filter(|(_, key)| doc.has_data(root, key))
            .fold(Self::empty(), |acc, (flag, _)| acc | *flag)
    }
}

/// Mutable state of one overlay.
#[derive(Debug, Clone)]
pub struct InstanceState {
    root: NodeId,
    pub(crate) phase: Phase,
    pub(crate) flags: StateFlags,
    pub(crate) generation: u64,
    pub(crate) lock_generation: u64,
    pub(crate) status: OverlayStatus,
    /// Options used by listener-driven hides (Escape, outside click, toggle).
    pub(crate) options: OverlayOptions,
}

impl InstanceState {
    fn new(root: NodeId) -> Self {
        Self {
            root,
            phase: Phase::Closed,
            flags: StateFlags::empty(),
            generation: 0,
            lock_generation: 0,
            status: OverlayStatus::INITIAL,
            options: OverlayOptions::default(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn flags(&self) -> StateFlags {
        self.flags
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.flags.contains(StateFlags::OPEN)
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.flags.contains(StateFlags::LOCKED)
    }

    /// Latest status report.
    #[inline]
    pub fn status(&self) -> OverlayStatus {
        self.status
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Slot storage for instances, indexed by root element.
#[derive(Debug, Default)]
pub struct InstanceArena {
    slots: Vec<Option<InstanceState>>,
    by_root: AHashMap<NodeId, InstanceId>,
}

impl InstanceArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Instance for `root`, creating it if needed.
    pub fn ensure(&mut self, root: NodeId) -> InstanceId {
        if let Some(&id) = self.by_root.get(&root) {
            return id;
        }
        let state = InstanceState::new(root);
        let id = match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(state);
                InstanceId(index as u32)
            }
            None => {
                self.slots.push(Some(state));
                InstanceId((self.slots.len() - 1) as u32)
            }
        };
        self.by_root.insert(root, id);
        id
    }

    pub fn id_for(&self, root: NodeId) -> Option<InstanceId> {
        self.by_root.get(&root).copied()
    }

    pub fn get(&self, id: InstanceId) -> Option<&InstanceState> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut InstanceState> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub fn by_root(&self, root: NodeId) -> Option<&InstanceState> {
        self.get(self.id_for(root)?)
    }

    /// Drop the instance for `root`, freeing its slot.
    pub fn release(&mut self, root: NodeId) -> Option<(InstanceId, InstanceState)> {
        let id = self.by_root.remove(&root)?;
        let state = self.slots.get_mut(id.index())?.take()?;
        Some((id, state))
    }

    pub fn len(&self) -> usize {
        self.by_root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_root.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstanceId, &InstanceState)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (InstanceId(i as u32), s)))
    }
}
