//! Snapshot-to-batch translation over the mapping table.
//!
//! The translator owns the mapping buffer and, per tick, evaluates every
//! mapping in table order against the (filtered) snapshot and its own
//! state and timers. Each evaluation emits at most one
//! [`TranslationResult`]; the rows below are checked first match wins and
//! their state guards are disjoint by construction:
//!
//! 1. up → init reset, once the reset delay elapsed
//! 2. init → down, when the button is held
//! 3. down → first repeat, after the first-repeat delay
//! 4. repeat → repeat, at the repeat cadence
//! 5. down/repeat → up, when the button is no longer held
//!
//! Firing a batch interprets its results: perform the user callback and
//! timer resets, then commit the state advance.

use tracing::{debug, info};

use crate::controller::buttons::{Snapshot, VirtualButton};
use crate::translation::error::TranslationError;
use crate::translation::mapping::{
    any_button_unset, find_duplicate_button, ButtonMapping, RepeatPolicy,
};
use crate::translation::overtaking::OvertakingFilter;
use crate::translation::result::{ActionKind, TranslationBatch, TranslationResult};

/// Translates controller snapshots into action batches.
///
/// Invariant: there is only one mapping per virtual button, enforced at
/// construction. If mappings are in a state other than initial or
/// awaiting reset when the translator is retired, fire the results of
/// [`Translator::cleanup`] to avoid stuck host keys.
pub struct Translator {
    mappings: Vec<ButtonMapping>,
    filter: Option<OvertakingFilter>,
}

impl Translator {
    /// Builds a translator without exclusivity-group filtering.
    pub fn new(mappings: Vec<ButtonMapping>) -> Result<Self, TranslationError> {
        if let Some(button) = find_duplicate_button(&mappings) {
            return Err(TranslationError::DuplicateMapping(button));
        }
        if any_button_unset(&mappings) {
            return Err(TranslationError::InvalidMapping);
        }

        let mut translator = Self {
            mappings,
            filter: None,
        };
        for mapping in &mut translator.mappings {
            mapping.init_custom_timers();
        }
        info!(mappings = translator.mappings.len(), "translator ready");
        Ok(translator)
    }

    /// Builds a translator that applies the overtaking filter before
    /// every translation. The filter receives a fresh view of the table.
    pub fn with_filter(
        mappings: Vec<ButtonMapping>,
        mut filter: OvertakingFilter,
    ) -> Result<Self, TranslationError> {
        let mut translator = Self::new(mappings)?;
        filter.set_mappings(&translator.mappings);
        translator.filter = Some(filter);
        Ok(translator)
    }

    /// Translates one raw snapshot, applying the filter when present.
    pub fn translate(&mut self, snapshot: Snapshot) -> TranslationBatch {
        let snapshot = match &mut self.filter {
            Some(filter) => filter.filter(snapshot),
            None => snapshot,
        };
        self.translate_filtered(&snapshot)
    }

    /// Translates an already filtered snapshot. Deterministic: the same
    /// mapping states, snapshot and clock produce the same batch.
    pub fn translate_filtered(&self, snapshot: &[VirtualButton]) -> TranslationBatch {
        let mut batch = TranslationBatch::with_capacity(self.mappings.len());

        for (index, mapping) in self.mappings.iter().enumerate() {
            let held = snapshot.contains(&mapping.virtual_button());

            if let Some(reset) = self.reset_translation(index) {
                batch.resets.push(reset);
            } else if let Some(down) = self.down_translation(index, held) {
                batch.downs.push(down);
            } else if let Some(first) = self.first_repeat_translation(index, held) {
                batch.repeats.push(first);
            } else if let Some(repeat) = self.repeat_translation(index, held) {
                batch.repeats.push(repeat);
            } else if let Some(up) = self.up_translation(index, held) {
                batch.ups.push(up);
            }
        }

        if !batch.is_empty() {
            debug!(
                ups = batch.ups.len(),
                downs = batch.downs.len(),
                repeats = batch.repeats.len(),
                resets = batch.resets.len(),
                "translated snapshot"
            );
        }
        batch
    }

    /// Fires a batch: for each result, in bucket order, perform the
    /// action then commit the state advance.
    pub fn fire(&mut self, batch: &TranslationBatch) {
        for bucket in [&batch.ups, &batch.downs, &batch.repeats, &batch.resets] {
            self.fire_results(bucket);
        }
    }

    /// Fires a plain list of results in order. Used for cleanup actions.
    pub fn fire_results(&mut self, results: &[TranslationResult]) {
        for result in results {
            self.apply(result);
        }
    }

    /// Emits an up result for every mapping still holding a key down.
    /// Fire the returned results once at shutdown; a second call with no
    /// intervening translation returns nothing.
    pub fn cleanup(&mut self) -> Vec<TranslationResult> {
        let mut results = Vec::new();
        for (index, mapping) in self.mappings.iter().enumerate() {
            if mapping.needs_cleanup() {
                results.push(self.result_for(index, ActionKind::Up));
            }
        }
        if !results.is_empty() {
            info!(count = results.len(), "emitting cleanup key-ups");
        }
        results
    }

    /// Read-only access to the mapping table.
    pub fn mappings(&self) -> &[ButtonMapping] {
        &self.mappings
    }

    /// Read-only access to the overtaking filter, if one is attached.
    pub fn filter(&self) -> Option<&OvertakingFilter> {
        self.filter.as_ref()
    }

    fn apply(&mut self, result: &TranslationResult) {
        let mapping = &mut self.mappings[result.mapping_index];
        match result.kind {
            ActionKind::Down => {
                mapping.invoke_down();
                // Rearm both timers so repeat gating restarts from the
                // moment of activation.
                mapping.state.last_sent.reset();
                mapping.state.first_repeat_delay.reset();
                mapping.state.set_down();
            }
            ActionKind::FirstRepeat | ActionKind::Repeat => {
                mapping.invoke_repeat();
                mapping.state.last_sent.reset();
                mapping.state.set_repeat();
            }
            ActionKind::Up => {
                mapping.invoke_up();
                mapping.state.set_up();
            }
            ActionKind::Reset => {
                mapping.invoke_reset();
                mapping.state.last_sent.reset();
                mapping.state.set_initial();
            }
        }
    }

    fn result_for(&self, index: usize, kind: ActionKind) -> TranslationResult {
        let mapping = &self.mappings[index];
        TranslationResult {
            kind,
            mapping_index: index,
            button: mapping.virtual_button(),
            group: mapping.exclusivity_group(),
        }
    }

    fn reset_translation(&self, index: usize) -> Option<TranslationResult> {
        let mapping = &self.mappings[index];
        if mapping.state.is_up() && mapping.state.last_sent.is_elapsed() {
            return Some(self.result_for(index, ActionKind::Reset));
        }
        None
    }

    fn down_translation(&self, index: usize, held: bool) -> Option<TranslationResult> {
        let mapping = &self.mappings[index];
        if mapping.state.is_initial() && held {
            return Some(self.result_for(index, ActionKind::Down));
        }
        None
    }

    fn first_repeat_translation(&self, index: usize, held: bool) -> Option<TranslationResult> {
        let mapping = &self.mappings[index];
        let repeats = matches!(
            mapping.policy(),
            RepeatPolicy::Infinite | RepeatPolicy::FirstOnly
        );
        if mapping.state.is_down()
            && repeats
            && mapping.state.first_repeat_delay.is_elapsed()
            && held
        {
            return Some(self.result_for(index, ActionKind::FirstRepeat));
        }
        None
    }

    fn repeat_translation(&self, index: usize, held: bool) -> Option<TranslationResult> {
        let mapping = &self.mappings[index];
        if mapping.state.is_repeating()
            && mapping.policy() == RepeatPolicy::Infinite
            && mapping.state.last_sent.is_elapsed()
            && held
        {
            return Some(self.result_for(index, ActionKind::Repeat));
        }
        None
    }

    fn up_translation(&self, index: usize, held: bool) -> Option<TranslationResult> {
        let mapping = &self.mappings[index];
        if (mapping.state.is_down() || mapping.state.is_repeating()) && !held {
            return Some(self.result_for(index, ActionKind::Up));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Log = Arc<Mutex<Vec<String>>>;

    fn recording_mapping(button: VirtualButton, log: &Log) -> ButtonMapping {
        let (d, u, r, s) = (log.clone(), log.clone(), log.clone(), log.clone());
        ButtonMapping::new(button)
            .repeat_policy(RepeatPolicy::None)
            .repeat_delay(Duration::ZERO)
            .on_down(move || d.lock().unwrap().push(format!("{button}=down")))
            .on_up(move || u.lock().unwrap().push(format!("{button}=up")))
            .on_repeat(move || r.lock().unwrap().push(format!("{button}=repeat")))
            .on_reset(move || s.lock().unwrap().push(format!("{button}=reset")))
    }

    #[test]
    fn duplicate_buttons_are_rejected() {
        let mappings = vec![
            ButtonMapping::new(VirtualButton::A),
            ButtonMapping::new(VirtualButton::A),
        ];
        assert!(matches!(
            Translator::new(mappings),
            Err(TranslationError::DuplicateMapping(VirtualButton::A))
        ));
    }

    #[test]
    fn sentinel_buttons_are_rejected() {
        let mappings = vec![ButtonMapping::new(VirtualButton::NotSet)];
        assert!(matches!(
            Translator::new(mappings),
            Err(TranslationError::InvalidMapping)
        ));
    }

    #[test]
    fn single_mapping_produces_at_most_one_result_per_tick() {
        let log: Log = Default::default();
        let mut translator =
            Translator::new(vec![recording_mapping(VirtualButton::A, &log)]).unwrap();

        let batch = translator.translate(vec![VirtualButton::A]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.downs.len(), 1);
        translator.fire(&batch);

        let batch = translator.translate(vec![]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.ups.len(), 1);
        translator.fire(&batch);

        assert_eq!(*log.lock().unwrap(), vec!["A=down", "A=up"]);
    }

    #[test]
    fn unknown_snapshot_buttons_are_ignored() {
        let log: Log = Default::default();
        let mut translator =
            Translator::new(vec![recording_mapping(VirtualButton::A, &log)]).unwrap();

        let batch = translator.translate(vec![VirtualButton::DpadUp, VirtualButton::Start]);
        assert!(batch.is_empty());
    }

    #[test]
    fn cleanup_releases_held_mappings_once() {
        let log: Log = Default::default();
        let mut translator =
            Translator::new(vec![recording_mapping(VirtualButton::A, &log)]).unwrap();

        let batch = translator.translate(vec![VirtualButton::A]);
        translator.fire(&batch);

        let cleanup = translator.cleanup();
        assert_eq!(cleanup.len(), 1);
        assert_eq!(cleanup[0].kind, ActionKind::Up);
        translator.fire_results(&cleanup);

        // No intervening translation: nothing left to release.
        assert!(translator.cleanup().is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["A=down", "A=up"]);
    }
}
