//! C7: the state machine. Mode-stack nesting validation, motion-block
//! signature checking, and `If`/`ElseIf`/`Else` branch selection (spec §3,
//! §4.7).

mod conditional;
mod mode;
mod motion;

pub use conditional::{ConditionEvaluator, ConditionalStack};
pub use mode::{ModeKind, ModeStack};
pub use motion::{MotionBlock, RequestSignature};
