//! Shared types for the spindle game-logic engine.
//!
//! Defines the decision data model produced by rule evaluation and the
//! persisted game snapshot, together with their binary codecs.

mod codec;
mod decision;
mod snapshot;

pub use codec::{read_string, read_u64_list, string_encode_size, u64_list_encode_size, write_string, write_u64_list};
pub use decision::{Decision, DecisionDef, DecisionError, DecisionResult};
pub use snapshot::{
    GameSnapshot, PlayerSelection, SelectionScope, MAX_CARRY_OVER_BYTES, MAX_CONTEXT_LEN,
    MAX_CYCLE_STREAMS, MAX_SELECTIONS, MAX_SELECTION_INDEXES, MAX_STREAM_LEN, SNAPSHOT_VERSION,
};
