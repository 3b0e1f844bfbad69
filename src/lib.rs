//! Gamepad-to-keyboard action translation.
//!
//! `padkey` turns a stream of "currently held" controller-button snapshots
//! into an ordered stream of down/repeat/up/reset action events. Each
//! logical button is bound to user callbacks through a mapping table with
//! a per-mapping key-repeat policy; mappings can share an exclusivity
//! group so that only one member of the group is active at a time, with
//! queued overtaking when a second member is pressed.
//!
//! Data flow per tick:
//!
//! ```text
//! SnapshotSampler ──watch──► TranslationEngine
//!                              │ OvertakingFilter ─► Translator ─► TranslationBatch
//!                              └─ fires the batch (callbacks + state commits)
//! ```

pub mod config;
pub mod controller;
pub mod profile;
pub mod translation;

pub use config::Config;
pub use controller::buttons::{GroupId, Snapshot, VirtualButton};
pub use translation::{
    ActionKind, ButtonMapping, EngineHandle, OvertakingFilter, RepeatPolicy, TranslationBatch,
    TranslationError, TranslationResult, Translator,
};
