//! Dialogue engine — the voice command state machine.
//!
//! - [`state`]: the [`DialogueState`] enum.
//! - [`vocab`]: Thai keywords and reply templates.
//! - [`machine`]: the pure transition function [`decide`].
//! - [`runner`]: [`DialogueController`], which turns decisions into
//!   publishing, speaking and capture gating.

pub mod machine;
pub mod runner;
pub mod state;
pub mod vocab;

pub use machine::{decide, Turn, UtteranceResponse};
pub use runner::{DialogueController, DialogueError, TurnOutcome};
pub use state::DialogueState;
