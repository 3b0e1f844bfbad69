//! Error types for the translation subsystem.
//!
//! The hot path is infallible by design; everything here surfaces at
//! translator construction time.

use thiserror::Error;

use crate::controller::buttons::VirtualButton;

/// Errors detected while validating a mapping table.
#[derive(Debug, Error)]
pub enum TranslationError {
    /// Two mappings share the same virtual button.
    ///
    /// The translator requires at most one mapping per virtual button so
    /// that group queues and snapshot lookups stay unambiguous.
    #[error("more than one mapping for virtual button {0}")]
    DuplicateMapping(VirtualButton),

    /// A mapping uses the `NotSet` sentinel as its virtual button.
    #[error("mapping uses the NotSet sentinel as its virtual button")]
    InvalidMapping,
}
