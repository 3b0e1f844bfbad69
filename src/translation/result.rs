//! Translation results and per-tick batches.
//!
//! A [`TranslationResult`] is the record of one state-machine transition
//! for one mapping: which action to perform and which state advance to
//! commit. Results are tagged descriptors carrying the mapping's table
//! index; the translator interprets them when the batch is fired, which
//! keeps all state mutation inside the translator and avoids boxing
//! closures on the hot path.

use crate::controller::buttons::{GroupId, VirtualButton};

/// The transition a [`TranslationResult`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    /// Init→Down: fire `on_down`, reset both timers.
    Down,
    /// Down→Repeat: the first repeat after the debounce delay.
    FirstRepeat,
    /// Repeat→Repeat: a subsequent repeat at the repeat cadence.
    Repeat,
    /// Down/Repeat→Up: fire `on_up`.
    Up,
    /// Up→Init: fire `on_reset`, rearm `last_sent`.
    Reset,
}

/// One deferred (action, commit) pair for one mapping.
#[derive(Debug, Clone, Copy)]
pub struct TranslationResult {
    pub kind: ActionKind,
    /// Index of the mapping in the translator's table.
    pub mapping_index: usize,
    pub button: VirtualButton,
    pub group: Option<GroupId>,
}

/// All results produced for one tick, grouped into firing buckets.
///
/// When fired, buckets run in the order ups → downs → repeats → resets,
/// insertion order within each bucket. Releases are serviced before new
/// acquisitions so a single tick can never leave the host observing two
/// simultaneous downs for the same logical key.
#[derive(Debug, Clone, Default)]
pub struct TranslationBatch {
    pub ups: Vec<TranslationResult>,
    pub downs: Vec<TranslationResult>,
    pub repeats: Vec<TranslationResult>,
    pub resets: Vec<TranslationResult>,
}

impl TranslationBatch {
    /// A batch sized for a table of `mappings` entries, which bounds the
    /// number of results a single tick can produce.
    pub fn with_capacity(mappings: usize) -> Self {
        Self {
            ups: Vec::with_capacity(mappings),
            downs: Vec::with_capacity(mappings),
            repeats: Vec::with_capacity(mappings),
            resets: Vec::with_capacity(mappings),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ups.is_empty()
            && self.downs.is_empty()
            && self.repeats.is_empty()
            && self.resets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ups.len() + self.downs.len() + self.repeats.len() + self.resets.len()
    }

    /// All results in firing order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = &TranslationResult> {
        self.ups
            .iter()
            .chain(self.downs.iter())
            .chain(self.repeats.iter())
            .chain(self.resets.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(kind: ActionKind, button: VirtualButton) -> TranslationResult {
        TranslationResult {
            kind,
            mapping_index: 0,
            button,
            group: None,
        }
    }

    #[test]
    fn firing_order_is_ups_downs_repeats_resets() {
        let mut batch = TranslationBatch::default();
        batch.resets.push(result(ActionKind::Reset, VirtualButton::A));
        batch.downs.push(result(ActionKind::Down, VirtualButton::B));
        batch.ups.push(result(ActionKind::Up, VirtualButton::X));
        batch
            .repeats
            .push(result(ActionKind::Repeat, VirtualButton::Y));

        let kinds: Vec<ActionKind> = batch.iter_in_order().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Up,
                ActionKind::Down,
                ActionKind::Repeat,
                ActionKind::Reset
            ]
        );
        assert_eq!(batch.len(), 4);
        assert!(!batch.is_empty());
    }
}
