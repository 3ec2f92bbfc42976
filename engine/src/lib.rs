//! Spindle game logic engine.
//!
//! This crate bridges game rules and randomness: rules consume abstract
//! decisions through [`DecisionGenerator`], and the engine realizes them
//! from live entropy, a recorded stream, or player input, recording every
//! outcome as a canonical `u64` stream that replays bit-for-bit.
//!
//! ## Determinism requirements
//! - Rule evaluation must make the same decision calls in the same order
//!   for a given game state; replay depends on it.
//! - Decision outcomes come only from the supplied generator; never from
//!   ambient randomness or wall-clock time.
//!
//! ## Recording invariants
//! The recorder's log is byte-compatible with the stream encoder, so
//! `Replay(Record(G))` reproduces `G`'s realized values for any generator
//! `G` and any call sequence. The round driver persists the log after each
//! cycle and replays it for history display and crash recovery.
//!
//! The primary entrypoint is [`RoundDriver`].

pub mod encode;
pub mod gaff;
pub mod generator;
pub mod generators;
pub mod recorder;
pub mod rng;
pub mod round_driver;
pub mod state;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

#[cfg(test)]
mod round_trip;

pub use encode::{encode_decision, encode_flag, encode_picks, encode_unweighted, encode_weighted};
pub use gaff::{materialize, materialize_with};
pub use generator::{DecisionContext, DecisionGenerator, GeneratorError};
pub use generators::{
    GaffAuthoringGenerator, LiveGenerator, PersistentInitGenerator, PlayerSelectionGenerator,
    SceneInitGenerator, StreamReplayGenerator,
};
pub use recorder::{CountingGenerator, RecordingGenerator};
pub use rng::{draw_below, RandSource, RngSource};
pub use round_driver::{
    CycleError, CycleEvaluator, RoundDriver, CURRENT_GAME_KEY, PREVIOUS_GAME_KEY,
};
pub use state::Nvram;

#[cfg(any(test, feature = "mocks"))]
pub use state::Memory;
