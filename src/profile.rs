//! Demo mapping profile.
//!
//! Builds the driver mapping table used by the binary: the four pad
//! buttons compete in one exclusivity group, the left-stick compass
//! directions and both triggers compete in another, and the shoulder
//! buttons are unrestricted. All callbacks log through `tracing`, which
//! makes the translation stream visible without injecting host input.

use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::controller::buttons::{GroupId, VirtualButton};
use crate::translation::mapping::{ButtonMapping, RepeatPolicy};

/// Pad buttons exclusivity grouping.
pub const PAD_BUTTON_GROUP: GroupId = 111;

/// Left thumbstick (plus triggers) exclusivity grouping.
pub const LEFT_STICK_GROUP: GroupId = 101;

/// A mapping whose four callbacks log `label=[DOWN]`-style lines.
fn logging_mapping(label: &'static str, button: VirtualButton) -> ButtonMapping {
    ButtonMapping::new(button)
        .on_down(move || info!("{}=[DOWN]", label))
        .on_up(move || info!("{}=[UP]", label))
        .on_repeat(move || info!("{}=[REPEAT]", label))
        .on_reset(move || info!("{}=[RESET]", label))
}

/// Builds the demo mapping table.
pub fn driver_button_mappings(config: &Config) -> Vec<ButtonMapping> {
    let repeat_delay = Duration::from_millis(config.translator.key_repeat_delay_ms);
    let first_repeat_delay = Duration::from_millis(config.translator.first_repeat_delay_ms);

    let stick_mapping = |label: &'static str, button: VirtualButton| {
        logging_mapping(label, button)
            .group(LEFT_STICK_GROUP)
            .repeat_policy(RepeatPolicy::Infinite)
            .repeat_delay(repeat_delay)
            .first_repeat_delay(first_repeat_delay)
    };

    vec![
        // Pad buttons
        logging_mapping("[PAD_A]", VirtualButton::A)
            .group(PAD_BUTTON_GROUP)
            .repeat_policy(RepeatPolicy::Infinite)
            .repeat_delay(repeat_delay)
            .first_repeat_delay(Duration::from_millis(500)),
        logging_mapping("[PAD_B]", VirtualButton::B)
            .group(PAD_BUTTON_GROUP)
            .repeat_policy(RepeatPolicy::FirstOnly)
            .first_repeat_delay(Duration::from_secs(2)),
        logging_mapping("[PAD_X]", VirtualButton::X)
            .group(PAD_BUTTON_GROUP)
            .repeat_policy(RepeatPolicy::FirstOnly)
            .first_repeat_delay(Duration::from_secs(2)),
        logging_mapping("[PAD_Y]", VirtualButton::Y)
            .group(PAD_BUTTON_GROUP)
            .repeat_policy(RepeatPolicy::FirstOnly)
            .first_repeat_delay(Duration::from_secs(2)),
        // Left thumbstick directional stuff
        stick_mapping("[LSTICK_UP]", VirtualButton::LeftStickUp),
        stick_mapping("[LSTICK_UP_RIGHT]", VirtualButton::LeftStickUpRight),
        stick_mapping("[LSTICK_RIGHT]", VirtualButton::LeftStickRight),
        stick_mapping("[LSTICK_DOWN_RIGHT]", VirtualButton::LeftStickDownRight),
        stick_mapping("[LSTICK_DOWN]", VirtualButton::LeftStickDown),
        stick_mapping("[LSTICK_DOWN_LEFT]", VirtualButton::LeftStickDownLeft),
        stick_mapping("[LSTICK_LEFT]", VirtualButton::LeftStickLeft),
        stick_mapping("[LSTICK_UP_LEFT]", VirtualButton::LeftStickUpLeft),
        logging_mapping("[LTRIGGER]", VirtualButton::LeftTrigger)
            .group(LEFT_STICK_GROUP)
            .repeat_policy(RepeatPolicy::None),
        logging_mapping("[RTRIGGER]", VirtualButton::RightTrigger)
            .group(LEFT_STICK_GROUP)
            .repeat_policy(RepeatPolicy::None),
        // Shoulder buttons, unrestricted
        ButtonMapping::new(VirtualButton::ShoulderRight)
            .repeat_policy(RepeatPolicy::None)
            .on_down(|| info!("[SHOULDER_RIGHT]=[DOWN]")),
        ButtonMapping::new(VirtualButton::ShoulderLeft)
            .repeat_policy(RepeatPolicy::None)
            .on_down(|| info!("[SHOULDER_LEFT]=[DOWN]")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::overtaking::OvertakingFilter;
    use crate::translation::translator::Translator;

    #[test]
    fn profile_builds_a_valid_translator() {
        let config = Config::default();
        let mappings = driver_button_mappings(&config);
        let translator = Translator::with_filter(mappings, OvertakingFilter::new());
        assert!(translator.is_ok());
    }

    #[test]
    fn profile_groups_pad_buttons_together() {
        let config = Config::default();
        let mappings = driver_button_mappings(&config);
        let pad: Vec<_> = mappings
            .iter()
            .filter(|m| m.exclusivity_group() == Some(PAD_BUTTON_GROUP))
            .map(|m| m.virtual_button())
            .collect();
        assert_eq!(
            pad,
            vec![
                VirtualButton::A,
                VirtualButton::B,
                VirtualButton::X,
                VirtualButton::Y
            ]
        );
    }
}
