//! Controller input side of the pipeline.
//!
//! Implements the snapshot producer and its supporting types:
//!
//! 1. [`buttons`] - The closed virtual-button identifier space
//! 2. [`polar`] - Thumbstick polar decomposition into compass directions
//! 3. [`sampler`] - gilrs-backed sampling into held-button snapshots
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► SnapshotSampler ──watch──► Snapshot (held VirtualButtons)
//!             (gilrs events)             (duplicate-free, press order)
//! ```

pub mod buttons;
pub mod polar;
pub mod sampler;

pub use buttons::{GroupId, Snapshot, VirtualButton};
pub use polar::{
    button_for_direction, compute_polar_pair, direction_for_polar_theta, Stick, StickDirection,
};
pub use sampler::{SamplerError, SamplerHandle, SamplerSettings};
