//! Stream replay generator: the decoding inverse of the stream encoder.

use super::{nth_unused, weighted_at};
use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};

/// Consumes a pre-supplied flat `u64` stream in order, reconstructing the
/// realized values the stream encodes. How many values each call consumes is
/// determined purely by the call's shape, mirroring the encoder's arity.
///
/// The only failure mode is running off the end of the stream, which signals
/// that round state and the recorded stream are out of sync.
pub struct StreamReplayGenerator {
    stream: Vec<u64>,
    cursor: usize,
}

impl StreamReplayGenerator {
    pub fn new(stream: Vec<u64>) -> Self {
        Self { stream, cursor: 0 }
    }

    /// Number of stream values consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }

    /// Number of stream values not yet consumed.
    pub fn remaining(&self) -> usize {
        self.stream.len() - self.cursor
    }

    fn next(&mut self) -> Result<u64, GeneratorError> {
        let Some(&value) = self.stream.get(self.cursor) else {
            return Err(GeneratorError::StreamExhausted {
                cursor: self.cursor,
                len: self.stream.len(),
            });
        };
        self.cursor += 1;
        Ok(value)
    }

    fn decode_unweighted(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
    ) -> Result<Vec<u64>, GeneratorError> {
        let mut picks = Vec::with_capacity(pick_count);
        if allow_duplicates {
            // Values in a canonical stream are already in range; injected
            // streams may not be, and clamp like the rank path does.
            let cap = index_count.saturating_sub(1);
            for _ in 0..pick_count {
                picks.push(self.next()?.min(cap));
            }
            return Ok(picks);
        }
        let mut used: Vec<u64> = Vec::new();
        for _ in 0..pick_count {
            let rank = self.next()?;
            let pick = nth_unused(index_count, &used, rank);
            used.push(pick);
            picks.push(pick);
        }
        Ok(picks)
    }

    fn decode_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
    ) -> Result<Vec<u64>, GeneratorError> {
        let mut used: Vec<u64> = Vec::new();
        let mut picks = Vec::with_capacity(pick_count);
        for _ in 0..pick_count {
            let value = self.next()?;
            let pick = weighted_at(weights, &used, allow_duplicates, value);
            if !allow_duplicates {
                used.push(pick);
            }
            picks.push(pick);
        }
        Ok(picks)
    }
}

impl DecisionGenerator for StreamReplayGenerator {
    fn get_decision(
        &mut self,
        true_weight: u64,
        _false_weight: u64,
        _context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        let value = self.next()?;
        Ok(value < true_weight)
    }

    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        self.decode_unweighted(index_count, pick_count, allow_duplicates)
    }

    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        self.decode_weighted(weights, pick_count, allow_duplicates)
    }

    fn choose_weighted_with(
        &mut self,
        index_count: u64,
        weight_of: &dyn Fn(u64) -> u64,
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let weights: Vec<u64> = (0..index_count).map(weight_of).collect();
        self.decode_weighted(&weights, pick_count, allow_duplicates)
    }

    fn pick_indexes(
        &mut self,
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        // Recorded streams satisfy extra <= max - min; injected streams may
        // carry anything, so clamp before the count arithmetic.
        let extra = self.next()?.min(max_count.saturating_sub(min_count));
        let count = min_count + extra;
        self.decode_unweighted(index_count, count as usize, allow_duplicates)
    }
}
