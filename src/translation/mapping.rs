//! Controller button to action mapping.
//!
//! A [`ButtonMapping`] describes how one virtual button translates into
//! host actions: which callbacks fire on down/up/repeat/reset, how the
//! button repeats while held, and which exclusivity group (if any) the
//! button competes in. The descriptor itself is immutable after
//! construction; only the embedded [`MappingState`] advances.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use crate::controller::buttons::{GroupId, VirtualButton};
use crate::translation::state::MappingState;

/// Zero-argument action callback attached to a mapping slot.
pub type ActionFn = Box<dyn FnMut() + Send>;

/// How a held button translates once the first-repeat delay has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatPolicy {
    /// Repeats for as long as the button is held, gated by the repeat
    /// delay between activations.
    #[default]
    Infinite,
    /// Sends exactly one repeat after the first-repeat delay, then stays
    /// silent until release.
    FirstOnly,
    /// Never repeats; down and up only.
    None,
}

/// Binding of a controller button to its action callbacks.
pub struct ButtonMapping {
    button: VirtualButton,
    repeat_policy: RepeatPolicy,
    group: Option<GroupId>,
    on_down: Option<ActionFn>,
    on_up: Option<ActionFn>,
    on_repeat: Option<ActionFn>,
    on_reset: Option<ActionFn>,
    first_repeat_delay: Option<Duration>,
    repeat_delay: Option<Duration>,
    pub(crate) state: MappingState,
}

impl ButtonMapping {
    /// Creates a mapping with no callbacks, infinite repeat and default
    /// timer periods. Attach behavior with the builder methods.
    pub fn new(button: VirtualButton) -> Self {
        Self {
            button,
            repeat_policy: RepeatPolicy::default(),
            group: None,
            on_down: None,
            on_up: None,
            on_repeat: None,
            on_reset: None,
            first_repeat_delay: None,
            repeat_delay: None,
            state: MappingState::default(),
        }
    }

    pub fn repeat_policy(mut self, policy: RepeatPolicy) -> Self {
        self.repeat_policy = policy;
        self
    }

    pub fn group(mut self, group: GroupId) -> Self {
        self.group = Some(group);
        self
    }

    pub fn on_down(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_down = Some(Box::new(callback));
        self
    }

    pub fn on_up(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_up = Some(Box::new(callback));
        self
    }

    pub fn on_repeat(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_repeat = Some(Box::new(callback));
        self
    }

    pub fn on_reset(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_reset = Some(Box::new(callback));
        self
    }

    /// Custom delay before the first repeat while the button is held.
    pub fn first_repeat_delay(mut self, delay: Duration) -> Self {
        self.first_repeat_delay = Some(delay);
        self
    }

    /// Custom delay between repeats (and before the up→init reset).
    pub fn repeat_delay(mut self, delay: Duration) -> Self {
        self.repeat_delay = Some(delay);
        self
    }

    pub fn virtual_button(&self) -> VirtualButton {
        self.button
    }

    pub fn exclusivity_group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn policy(&self) -> RepeatPolicy {
        self.repeat_policy
    }

    pub fn needs_cleanup(&self) -> bool {
        self.state.needs_cleanup()
    }

    /// Applies the optional custom delays to the embedded timers. Called
    /// once by the translator when it takes ownership of the table.
    pub(crate) fn init_custom_timers(&mut self) {
        if let Some(delay) = self.repeat_delay {
            self.state.last_sent.reset_with(delay);
        }
        if let Some(delay) = self.first_repeat_delay {
            self.state.first_repeat_delay.reset_with(delay);
        }
    }

    pub(crate) fn invoke_down(&mut self) {
        if let Some(callback) = &mut self.on_down {
            callback();
        }
    }

    pub(crate) fn invoke_up(&mut self) {
        if let Some(callback) = &mut self.on_up {
            callback();
        }
    }

    pub(crate) fn invoke_repeat(&mut self) {
        if let Some(callback) = &mut self.on_repeat {
            callback();
        }
    }

    pub(crate) fn invoke_reset(&mut self) {
        if let Some(callback) = &mut self.on_reset {
            callback();
        }
    }
}

impl fmt::Debug for ButtonMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonMapping")
            .field("button", &self.button)
            .field("repeat_policy", &self.repeat_policy)
            .field("group", &self.group)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Returns the first virtual button that appears in more than one
/// mapping, if any.
pub(crate) fn find_duplicate_button(mappings: &[ButtonMapping]) -> Option<VirtualButton> {
    let mut seen = HashSet::with_capacity(mappings.len());
    for mapping in mappings {
        if !seen.insert(mapping.virtual_button()) {
            return Some(mapping.virtual_button());
        }
    }
    None
}

/// True when some mapping uses the `NotSet` sentinel.
pub(crate) fn any_button_unset(mappings: &[ButtonMapping]) -> bool {
    mappings
        .iter()
        .any(|mapping| mapping.virtual_button() == VirtualButton::NotSet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn builder_attaches_callbacks_and_metadata() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let mut mapping = ButtonMapping::new(VirtualButton::A)
            .group(7)
            .repeat_policy(RepeatPolicy::FirstOnly)
            .on_down(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(mapping.virtual_button(), VirtualButton::A);
        assert_eq!(mapping.exclusivity_group(), Some(7));
        assert_eq!(mapping.policy(), RepeatPolicy::FirstOnly);

        mapping.invoke_down();
        mapping.invoke_up(); // unset slot, silently skipped
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn custom_timers_replace_the_default_periods() {
        let mut mapping = ButtonMapping::new(VirtualButton::B)
            .repeat_delay(Duration::from_millis(5))
            .first_repeat_delay(Duration::from_millis(9));
        mapping.init_custom_timers();

        assert_eq!(mapping.state.last_sent.period(), Duration::from_millis(5));
        assert_eq!(
            mapping.state.first_repeat_delay.period(),
            Duration::from_millis(9)
        );
    }

    #[test]
    fn duplicate_and_sentinel_detection() {
        let mappings = vec![
            ButtonMapping::new(VirtualButton::A),
            ButtonMapping::new(VirtualButton::B),
            ButtonMapping::new(VirtualButton::A),
        ];
        assert_eq!(find_duplicate_button(&mappings), Some(VirtualButton::A));
        assert!(!any_button_unset(&mappings));

        let with_sentinel = vec![ButtonMapping::new(VirtualButton::NotSet)];
        assert!(any_button_unset(&with_sentinel));
    }
}
