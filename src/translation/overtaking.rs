//! Exclusivity-group overtaking filter.
//!
//! A mapping's exclusivity group allows only a single member of the group
//! to be in the down/repeat state at a time. The filter rewrites each
//! tick's snapshot before it reaches the translator: the activated member
//! stays visible, newly pressed members overtake the current activation
//! (which receives a key-up by vanishing from the visible snapshot), and
//! overtaken members wait in a per-group queue until the activation above
//! them releases.
//!
//! This behavior is deviously complex; modifications are best done to
//! [`GroupActivation`] only, if at all possible. When a single snapshot
//! contains presently unhandled downs for several mappings of the same
//! group, only one overtaking down is processed per tick and the rest are
//! suppressed to be handled on the next tick.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::controller::buttons::{GroupId, Snapshot, VirtualButton};
use crate::translation::mapping::ButtonMapping;

/// Activation status of one exclusivity group.
///
/// The front of the queue is the activated button; everything behind it
/// has been overtaken and waits in most-recently-overtaken-first order.
/// An empty queue means no member of the group is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupActivation {
    queue: VecDeque<VirtualButton>,
}

impl GroupActivation {
    /// Decides what a new down for `vk` means for this group.
    ///
    /// Returns `(suppress, up_for)`: `suppress` is true when the down
    /// must be removed from the visible snapshot (the button is waiting
    /// in the overtaken queue), and `up_for` names the previously
    /// activated button that now needs a key-up because `vk` overtook it.
    ///
    /// Precondition: `vk` belongs to this group per the mapping table.
    pub fn on_new_down(&mut self, vk: VirtualButton) -> (bool, Option<VirtualButton>) {
        let is_activated = self.active() == Some(vk);
        let is_overtaken = self.is_overtaken(vk);
        if is_activated || is_overtaken {
            return (is_overtaken, None);
        }

        // An existing activation is overtaken by the new down.
        if let Some(current) = self.active() {
            self.queue.push_front(vk);
            return (false, Some(current));
        }

        // New activation; nothing to filter, nothing to release.
        self.queue.push_front(vk);
        (false, None)
    }

    /// Decides what a release of `vk` means for this group.
    ///
    /// Returns the button that becomes the new activation when the
    /// released button was the front of the queue and an overtaken button
    /// was waiting behind it. The caller decides whether to synthesize a
    /// down for it.
    pub fn on_new_up(&mut self, vk: VirtualButton) -> Option<VirtualButton> {
        if self.queue.is_empty() {
            return None;
        }

        let position = self.queue.iter().position(|&queued| queued == vk)?;
        if position == 0 {
            self.queue.pop_front();
            return self.active();
        }

        // One of the overtaken; it never received a visible down, so just
        // drop it from the queue.
        self.queue.remove(position);
        None
    }

    /// The currently activated button, if any.
    pub fn active(&self) -> Option<VirtualButton> {
        self.queue.front().copied()
    }

    pub fn contains(&self, vk: VirtualButton) -> bool {
        self.queue.contains(&vk)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn is_overtaken(&self, vk: VirtualButton) -> bool {
        self.queue.iter().skip(1).any(|&queued| queued == vk)
    }
}

/// Snapshot filter applying the overtaking behavior ahead of the
/// translator.
///
/// Holds its own view of the mapping table (button and group only) plus
/// one [`GroupActivation`] per group. Cloning the filter clones the queue
/// state verbatim; `set_mappings` resets it.
#[derive(Debug, Clone, Default)]
pub struct OvertakingFilter {
    /// (button, group) descriptors for every mapping in the table.
    buttons: Vec<(VirtualButton, Option<GroupId>)>,
    groups: BTreeMap<GroupId, GroupActivation>,
}

impl OvertakingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the mapping-table view and resets every group queue.
    pub fn set_mappings(&mut self, mappings: &[ButtonMapping]) {
        self.buttons = mappings
            .iter()
            .map(|mapping| (mapping.virtual_button(), mapping.exclusivity_group()))
            .collect();
        self.groups = BTreeMap::new();
        for (_, group) in &self.buttons {
            if let Some(group) = group {
                self.groups.entry(*group).or_default();
            }
        }
    }

    /// Rewrites one raw snapshot into the down-visible snapshot handed to
    /// the translator: at most one member per group is present, and it is
    /// the member that should hold the down/repeat state.
    pub fn filter(&mut self, snapshot: Snapshot) -> Snapshot {
        let state_update = self.defer_duplicate_group_downs(snapshot);
        let visible = self.filter_downs(&state_update);
        self.scan_ups(&state_update);
        visible
    }

    /// Uniqueness pre-pass: a single tick may introduce at most one *new*
    /// activation per group. Walking left to right, the first unhandled
    /// member of a group claims the tick; later members of the same group
    /// are removed and will be seen again in the next raw snapshot.
    ///
    /// Without this, several downs of one group in a single tick would
    /// update the group accounting for buttons the translator never got
    /// to process.
    fn defer_duplicate_group_downs(&self, snapshot: Snapshot) -> Snapshot {
        let mut claimed: Vec<GroupId> = Vec::new();
        let mut kept = Vec::with_capacity(snapshot.len());

        for vk in snapshot {
            match self.group_of(vk) {
                Some(group) if !self.groups[&group].contains(vk) => {
                    if claimed.contains(&group) {
                        debug!(button = %vk, group, "deferring duplicate group down to next tick");
                        continue;
                    }
                    claimed.push(group);
                    kept.push(vk);
                }
                _ => kept.push(vk),
            }
        }
        kept
    }

    /// Applies [`GroupActivation::on_new_down`] for every grouped button
    /// still present, removing suppressed downs and freshly overtaken
    /// activations from the visible snapshot.
    fn filter_downs(&mut self, state_update: &[VirtualButton]) -> Snapshot {
        let mut to_remove: Vec<VirtualButton> = Vec::new();

        for &vk in state_update {
            let Some(group) = self.group_of(vk) else {
                continue;
            };
            let activation = self.groups.entry(group).or_default();
            let (suppress, up_for) = activation.on_new_down(vk);
            if suppress {
                to_remove.push(vk);
            }
            if let Some(overtaken) = up_for {
                // About to be released, not pressed; hiding it from the
                // translator produces the key-up.
                to_remove.push(overtaken);
            }
        }

        let mut visible = state_update.to_vec();
        visible.retain(|vk| !to_remove.contains(vk));
        visible
    }

    /// Applies [`GroupActivation::on_new_up`] for every grouped mapping
    /// absent from the snapshot.
    ///
    /// The restored-activation return value is discarded on purpose: a
    /// button still waiting in the overtaken queue is still physically
    /// held, so it shows up in the next raw snapshot and receives its
    /// down through the translator then. Synthesizing it here would
    /// duplicate it.
    fn scan_ups(&mut self, state_update: &[VirtualButton]) {
        for &(vk, group) in &self.buttons {
            let Some(group) = group else { continue };
            if state_update.contains(&vk) {
                continue;
            }
            if let Some(activation) = self.groups.get_mut(&group) {
                activation.on_new_up(vk);
            }
        }
    }

    fn group_of(&self, vk: VirtualButton) -> Option<GroupId> {
        self.buttons
            .iter()
            .find(|(button, _)| *button == vk)
            .and_then(|(_, group)| *group)
    }

    /// Read access for invariant checks in tests.
    pub fn group_activation(&self, group: GroupId) -> Option<&GroupActivation> {
        self.groups.get(&group)
    }
}
