//! Recording and counting decorators.

use crate::encode::{encode_flag, encode_picks, encode_unweighted, encode_weighted};
use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};

/// Decorator that forwards every call to the wrapped generator and appends
/// the canonical encoding of each returned value to an ordered log. The log
/// is byte-compatible with the stream encoder's output, so it can be
/// persisted and replayed without going back through decision objects.
///
/// The wrapped generator is swappable mid-round; swapping does not clear the
/// log.
pub struct RecordingGenerator<'a> {
    inner: Box<dyn DecisionGenerator + 'a>,
    log: Vec<u64>,
}

impl<'a> RecordingGenerator<'a> {
    pub fn new(inner: Box<dyn DecisionGenerator + 'a>) -> Self {
        Self {
            inner,
            log: Vec::new(),
        }
    }

    /// Replace the wrapped generator, returning the previous one. The log is
    /// preserved across the swap.
    pub fn swap(
        &mut self,
        inner: Box<dyn DecisionGenerator + 'a>,
    ) -> Box<dyn DecisionGenerator + 'a> {
        std::mem::replace(&mut self.inner, inner)
    }

    pub fn log(&self) -> &[u64] {
        &self.log
    }

    pub fn into_log(self) -> Vec<u64> {
        self.log
    }
}

impl DecisionGenerator for RecordingGenerator<'_> {
    fn get_decision(
        &mut self,
        true_weight: u64,
        false_weight: u64,
        context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        let result = self.inner.get_decision(true_weight, false_weight, context)?;
        encode_flag(true_weight, result, &mut self.log);
        Ok(result)
    }

    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self
            .inner
            .choose_indexes(index_count, pick_count, allow_duplicates, context)?;
        encode_unweighted(allow_duplicates, &picks, &mut self.log);
        Ok(picks)
    }

    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self
            .inner
            .choose_weighted(weights, pick_count, allow_duplicates, context)?;
        encode_weighted(weights, allow_duplicates, &picks, &mut self.log);
        Ok(picks)
    }

    fn choose_weighted_with(
        &mut self,
        index_count: u64,
        weight_of: &dyn Fn(u64) -> u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self.inner.choose_weighted_with(
            index_count,
            weight_of,
            pick_count,
            allow_duplicates,
            context,
        )?;
        let weights: Vec<u64> = (0..index_count).map(weight_of).collect();
        encode_weighted(&weights, allow_duplicates, &picks, &mut self.log);
        Ok(picks)
    }

    fn pick_indexes(
        &mut self,
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self.inner.pick_indexes(
            index_count,
            min_count,
            max_count,
            allow_duplicates,
            context,
        )?;
        // Count first, then the selection, matching the encoder's rule.
        encode_picks(min_count, allow_duplicates, &picks, &mut self.log);
        Ok(picks)
    }
}

/// Decorator that counts how many canonical stream values the forwarded
/// calls correspond to, per the encoder's arity. Used to verify that a
/// candidate gaff stream is consumed exactly, and usable by test harnesses
/// validating arity assumptions.
pub struct CountingGenerator<G> {
    inner: G,
    consumed: usize,
}

impl<G: DecisionGenerator> CountingGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self { inner, consumed: 0 }
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: DecisionGenerator> DecisionGenerator for CountingGenerator<G> {
    fn get_decision(
        &mut self,
        true_weight: u64,
        false_weight: u64,
        context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        let result = self.inner.get_decision(true_weight, false_weight, context)?;
        self.consumed += 1;
        Ok(result)
    }

    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self
            .inner
            .choose_indexes(index_count, pick_count, allow_duplicates, context)?;
        self.consumed += picks.len();
        Ok(picks)
    }

    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self
            .inner
            .choose_weighted(weights, pick_count, allow_duplicates, context)?;
        self.consumed += picks.len();
        Ok(picks)
    }

    fn choose_weighted_with(
        &mut self,
        index_count: u64,
        weight_of: &dyn Fn(u64) -> u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self.inner.choose_weighted_with(
            index_count,
            weight_of,
            pick_count,
            allow_duplicates,
            context,
        )?;
        self.consumed += picks.len();
        Ok(picks)
    }

    fn pick_indexes(
        &mut self,
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let picks = self.inner.pick_indexes(
            index_count,
            min_count,
            max_count,
            allow_duplicates,
            context,
        )?;
        self.consumed += 1 + picks.len();
        Ok(picks)
    }
}
