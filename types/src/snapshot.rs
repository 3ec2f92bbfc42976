//! Persisted per-game state.
//!
//! [`GameSnapshot`] is the blob the round driver writes to NVRAM after every
//! mutation that must survive a power cycle. The layout is length-prefixed
//! lists of fixed-width integers with no self-describing schema; decode
//! order exactly matches encode order.

use crate::codec::{
    read_string, read_u64_list, string_encode_size, u64_list_encode_size, write_string,
    write_u64_list,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use std::collections::BTreeMap;

/// Snapshot layout version.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Maximum context-string length accepted on decode.
pub const MAX_CONTEXT_LEN: usize = 256;
/// Maximum number of recorded player selections.
pub const MAX_SELECTIONS: usize = 256;
/// Maximum indexes in one player selection.
pub const MAX_SELECTION_INDEXES: usize = 1024;
/// Maximum carry-over blob size.
pub const MAX_CARRY_OVER_BYTES: usize = 4096;
/// Maximum cycles recorded for one game.
pub const MAX_CYCLE_STREAMS: usize = 1024;
/// Maximum values in one cycle's stream.
pub const MAX_STREAM_LEN: usize = 65_536;

/// How long a recorded player selection outlives the cycle it was made in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionScope {
    /// Cleared when the cycle that consumed it commits.
    Cycle,
    /// Retained until the game is reset.
    Game,
}

impl Write for SelectionScope {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            SelectionScope::Cycle => 0u8.write(writer),
            SelectionScope::Game => 1u8.write(writer),
        }
    }
}

impl Read for SelectionScope {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let kind = u8::read(reader)?;
        match kind {
            0 => Ok(SelectionScope::Cycle),
            1 => Ok(SelectionScope::Game),
            _ => Err(Error::InvalidEnum(kind)),
        }
    }
}

impl EncodeSize for SelectionScope {
    fn encode_size(&self) -> usize {
        1
    }
}

/// A recorded player choice for one decision point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerSelection {
    pub scope: SelectionScope,
    pub indexes: Vec<u64>,
}

impl Write for PlayerSelection {
    fn write(&self, writer: &mut impl BufMut) {
        self.scope.write(writer);
        write_u64_list(&self.indexes, writer);
    }
}

impl Read for PlayerSelection {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            scope: SelectionScope::read(reader)?,
            indexes: read_u64_list(reader, MAX_SELECTION_INDEXES)?,
        })
    }
}

impl EncodeSize for PlayerSelection {
    fn encode_size(&self) -> usize {
        self.scope.encode_size() + u64_list_encode_size(&self.indexes)
    }
}

/// Durable per-game state owned by the round driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSnapshot {
    /// Currently selected stake index.
    pub stake_index: u32,
    /// Player selections keyed by decision context. BTreeMap so the encoded
    /// order is deterministic.
    pub selections: BTreeMap<String, PlayerSelection>,
    /// Opaque inter-cycle carry-over owned by the rule engine.
    pub carry_over: Vec<u8>,
    /// Canonical stream of each cycle evaluated so far this game, in order.
    pub cycle_streams: Vec<Vec<u64>>,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            stake_index: 0,
            selections: BTreeMap::new(),
            carry_over: Vec::new(),
            cycle_streams: Vec::new(),
        }
    }
}

impl GameSnapshot {
    /// Remove every selection recorded with the given scope.
    pub fn clear_selections(&mut self, scope: SelectionScope) {
        self.selections.retain(|_, s| s.scope != scope);
    }
}

impl Write for GameSnapshot {
    fn write(&self, writer: &mut impl BufMut) {
        SNAPSHOT_VERSION.write(writer);
        self.stake_index.write(writer);
        (self.selections.len() as u32).write(writer);
        for (context, selection) in &self.selections {
            write_string(context, writer);
            selection.write(writer);
        }
        self.carry_over.write(writer);
        (self.cycle_streams.len() as u32).write(writer);
        for stream in &self.cycle_streams {
            write_u64_list(stream, writer);
        }
    }
}

impl Read for GameSnapshot {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let version = u8::read(reader)?;
        if version != SNAPSHOT_VERSION {
            return Err(Error::InvalidEnum(version));
        }
        let stake_index = u32::read(reader)?;
        let selection_count = u32::read(reader)? as usize;
        if selection_count > MAX_SELECTIONS {
            return Err(Error::Invalid("GameSnapshot", "too many selections"));
        }
        let mut selections = BTreeMap::new();
        for _ in 0..selection_count {
            let context = read_string(reader, MAX_CONTEXT_LEN)?;
            let selection = PlayerSelection::read(reader)?;
            selections.insert(context, selection);
        }
        let carry_over = Vec::<u8>::read_range(reader, 0..=MAX_CARRY_OVER_BYTES)?;
        let stream_count = u32::read(reader)? as usize;
        if stream_count > MAX_CYCLE_STREAMS {
            return Err(Error::Invalid("GameSnapshot", "too many cycle streams"));
        }
        let mut cycle_streams = Vec::with_capacity(stream_count);
        for _ in 0..stream_count {
            cycle_streams.push(read_u64_list(reader, MAX_STREAM_LEN)?);
        }
        Ok(Self {
            stake_index,
            selections,
            carry_over,
            cycle_streams,
        })
    }
}

impl EncodeSize for GameSnapshot {
    fn encode_size(&self) -> usize {
        let mut size = 1 + self.stake_index.encode_size() + 4;
        for (context, selection) in &self.selections {
            size += string_encode_size(context) + selection.encode_size();
        }
        size += self.carry_over.encode_size();
        size += 4;
        for stream in &self.cycle_streams {
            size += u64_list_encode_size(stream);
        }
        size
    }
}
