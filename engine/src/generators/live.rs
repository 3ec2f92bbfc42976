//! Live generator: fresh randomness from the foundation RNG.

use super::{eligible_weight, nth_unused, weighted_at};
use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};
use crate::rng::{draw_below, RngSource};

/// Draws fresh uniform values from an [`RngSource`] and rescales them to the
/// requested weights and populations. Ignores decision contexts. Total over
/// contract-respecting inputs: it cannot fail.
pub struct LiveGenerator<R> {
    source: R,
}

impl<R: RngSource> LiveGenerator<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    /// Recover the underlying source.
    pub fn into_source(self) -> R {
        self.source
    }

    fn choose_weighted_table(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
    ) -> Vec<u64> {
        let mut used: Vec<u64> = Vec::new();
        let mut picks = Vec::with_capacity(pick_count);
        for _ in 0..pick_count {
            let total = eligible_weight(weights, &used, allow_duplicates);
            // A zero eligible total takes no draw; the walk lands on the
            // first eligible candidate.
            let value = draw_below(&mut self.source, total);
            let pick = weighted_at(weights, &used, allow_duplicates, value);
            if !allow_duplicates {
                used.push(pick);
            }
            picks.push(pick);
        }
        picks
    }
}

impl<R: RngSource> DecisionGenerator for LiveGenerator<R> {
    fn get_decision(
        &mut self,
        true_weight: u64,
        false_weight: u64,
        _context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        // Zero-weight branches take no draw.
        if true_weight == 0 {
            return Ok(false);
        }
        if false_weight == 0 {
            return Ok(true);
        }
        let value = draw_below(&mut self.source, true_weight + false_weight);
        Ok(value < true_weight)
    }

    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let mut picks = Vec::with_capacity(pick_count);
        if allow_duplicates {
            for _ in 0..pick_count {
                picks.push(draw_below(&mut self.source, index_count));
            }
            return Ok(picks);
        }
        let mut used: Vec<u64> = Vec::new();
        let mut remaining = index_count;
        for _ in 0..pick_count {
            let rank = draw_below(&mut self.source, remaining);
            let pick = nth_unused(index_count, &used, rank);
            used.push(pick);
            remaining = remaining.saturating_sub(1);
            picks.push(pick);
        }
        Ok(picks)
    }

    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        Ok(self.choose_weighted_table(weights, pick_count, allow_duplicates))
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
        Ok(self.choose_weighted_table(&weights, pick_count, allow_duplicates))
    }

    fn pick_indexes(
        &mut self,
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        // max_count == min_count spans a single value and takes no draw.
        let span = max_count - min_count + 1;
        let count = min_count + draw_below(&mut self.source, span);
        self.choose_indexes(index_count, count as usize, allow_duplicates, context)
    }
}
