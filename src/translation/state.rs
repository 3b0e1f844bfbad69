//! Per-mapping action state machine.
//!
//! Wraps the action state enum so that state modifications only occur
//! through guarded setters: there is exactly one current state, it can
//! only be one of a finite set of values, and it cannot be advanced out
//! of sequence. Also carries the two timers that gate repeats and the
//! post-release reset.

use std::time::Duration;

use crate::translation::timing::DelayTimer;

/// Delay a button has in between repeat activations when the mapping does
/// not carry a custom value. Also the default delay before the first
/// repeat while a button is held.
pub const DEFAULT_KEY_REPEAT_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionState {
    /// Ready for a new press cycle.
    #[default]
    Init,
    Down,
    Repeat,
    Up,
}

/// State variable plus timers for one mapping.
///
/// Valid transitions are Init→Down, Down→Repeat, Down→Up, Repeat→Up and
/// Up→Init; any other setter call is a no-op. A mapping therefore
/// completes exactly one Init→Down→(Repeat*)→Up→Init cycle per physical
/// press.
#[derive(Debug, Clone)]
pub struct MappingState {
    current: ActionState,
    /// Regulates the repeat cadence and the up→init reset delay.
    pub last_sent: DelayTimer,
    /// Delay before the first repeat while the button is held down.
    pub first_repeat_delay: DelayTimer,
}

impl Default for MappingState {
    fn default() -> Self {
        let last_sent = DelayTimer::new(DEFAULT_KEY_REPEAT_DELAY);
        Self {
            current: ActionState::Init,
            first_repeat_delay: DelayTimer::new(last_sent.period()),
            last_sent,
        }
    }
}

impl MappingState {
    pub fn is_initial(&self) -> bool {
        self.current == ActionState::Init
    }

    pub fn is_down(&self) -> bool {
        self.current == ActionState::Down
    }

    pub fn is_repeating(&self) -> bool {
        self.current == ActionState::Repeat
    }

    pub fn is_up(&self) -> bool {
        self.current == ActionState::Up
    }

    pub fn set_down(&mut self) {
        if self.current != ActionState::Init {
            return;
        }
        self.current = ActionState::Down;
    }

    pub fn set_repeat(&mut self) {
        if self.current != ActionState::Down {
            return;
        }
        self.current = ActionState::Repeat;
    }

    pub fn set_up(&mut self) {
        if self.current != ActionState::Down && self.current != ActionState::Repeat {
            return;
        }
        self.current = ActionState::Up;
    }

    pub fn set_initial(&mut self) {
        if self.current != ActionState::Up {
            return;
        }
        self.current = ActionState::Init;
    }

    /// True when the mapping is holding a key down on the host and would
    /// need a synthesized up before shutdown.
    pub fn needs_cleanup(&self) -> bool {
        self.is_down() || self.is_repeating()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_advances_in_sequence() {
        let mut state = MappingState::default();
        assert!(state.is_initial());

        state.set_down();
        assert!(state.is_down());
        state.set_repeat();
        assert!(state.is_repeating());
        state.set_up();
        assert!(state.is_up());
        state.set_initial();
        assert!(state.is_initial());
    }

    #[test]
    fn out_of_sequence_setters_are_ignored() {
        let mut state = MappingState::default();

        // Cannot repeat or release before a down.
        state.set_repeat();
        assert!(state.is_initial());
        state.set_up();
        assert!(state.is_initial());

        state.set_down();
        // Cannot re-enter down or reset while down.
        state.set_down();
        assert!(state.is_down());
        state.set_initial();
        assert!(state.is_down());

        state.set_repeat();
        // Repeat to repeat stays a no-op rather than an error.
        state.set_repeat();
        assert!(state.is_repeating());
    }

    #[test]
    fn cleanup_needed_only_while_held() {
        let mut state = MappingState::default();
        assert!(!state.needs_cleanup());
        state.set_down();
        assert!(state.needs_cleanup());
        state.set_repeat();
        assert!(state.needs_cleanup());
        state.set_up();
        assert!(!state.needs_cleanup());
    }
}
