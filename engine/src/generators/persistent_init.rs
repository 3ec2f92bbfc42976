//! Persistent-init generator.

use super::scene_init::smallest_selection;
use super::LiveGenerator;
use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};
use crate::rng::RngSource;

/// Composite used when persistent one-time state is first materialized at
/// cold start: simple, weighted, and indexed decisions draw live randomness
/// so the state is truly randomized, while `pick_indexes` answers with
/// scene-init placeholders so player-driven picks are not prematurely
/// resolved.
pub struct PersistentInitGenerator<R> {
    live: LiveGenerator<R>,
}

impl<R: RngSource> PersistentInitGenerator<R> {
    pub fn new(source: R) -> Self {
        Self {
            live: LiveGenerator::new(source),
        }
    }
}

impl<R: RngSource> DecisionGenerator for PersistentInitGenerator<R> {
    fn get_decision(
        &mut self,
        true_weight: u64,
        false_weight: u64,
        context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        self.live.get_decision(true_weight, false_weight, context)
    }

    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        self.live
            .choose_indexes(index_count, pick_count, allow_duplicates, context)
    }

    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        self.live
            .choose_weighted(weights, pick_count, allow_duplicates, context)
    }

    fn choose_weighted_with(
        &mut self,
        index_count: u64,
        weight_of: &dyn Fn(u64) -> u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        self.live
            .choose_weighted_with(index_count, weight_of, pick_count, allow_duplicates, context)
    }

    fn pick_indexes(
        &mut self,
        _index_count: u64,
        min_count: u64,
        _max_count: u64,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        Ok(smallest_selection(min_count as usize, allow_duplicates))
    }
}
