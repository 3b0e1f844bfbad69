//! Snapshot translation core: mapping state machines, the overtaking
//! filter, the translator and the engine that drives it per tick.

pub mod engine;
pub mod error;
pub mod mapping;
pub mod overtaking;
pub mod result;
pub mod state;
pub mod timing;
pub mod translator;

pub use engine::{EngineError, EngineHandle};
pub use error::TranslationError;
pub use mapping::{ActionFn, ButtonMapping, RepeatPolicy};
pub use overtaking::{GroupActivation, OvertakingFilter};
pub use result::{ActionKind, TranslationBatch, TranslationResult};
pub use state::{ActionState, MappingState};
pub use timing::DelayTimer;
pub use translator::Translator;
