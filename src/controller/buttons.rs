//! Virtual button identifiers and snapshot types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Exclusivity group identifier. Mappings sharing a group value allow
/// only one member to be active at a time.
pub type GroupId = u32;

/// One sampling instant's set of currently held buttons.
///
/// Duplicate-free and ordered; when several members of one exclusivity
/// group first appear in the same snapshot, the left-most wins the tick.
pub type Snapshot = Vec<VirtualButton>;

/// All known controller button and functionality identifiers usable with
/// the sampler and mapping tables.
///
/// The space is closed and known at build time; it covers the physical
/// buttons plus the decomposed analog surfaces (eight compass directions
/// per thumbstick, and the two triggers past their threshold).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VirtualButton {
    /// Invalid value; rejected in mapping tables.
    #[default]
    NotSet,

    A,
    B,
    X,
    Y,

    LeftTrigger,
    RightTrigger,

    ShoulderLeft,
    ShoulderRight,

    LeftStickClick,
    RightStickClick,

    Start,
    Back,

    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,

    LeftStickUp,
    LeftStickUpRight,
    LeftStickRight,
    LeftStickDownRight,
    LeftStickDown,
    LeftStickDownLeft,
    LeftStickLeft,
    LeftStickUpLeft,

    RightStickUp,
    RightStickUpRight,
    RightStickRight,
    RightStickDownRight,
    RightStickDown,
    RightStickDownLeft,
    RightStickLeft,
    RightStickUpLeft,
}

impl fmt::Display for VirtualButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
