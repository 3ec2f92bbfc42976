//! Player-selection lookup generator.

use super::scene_init::smallest_selection;
use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};
use spindle_types::PlayerSelection;
use std::collections::BTreeMap;

/// Decorator that answers `pick_indexes` from previously recorded player
/// choices, keyed by decision context. Every other call is forwarded to the
/// inner generator.
///
/// A missing context or an out-of-bounds stored count is a contract
/// violation and fails the round; defaulting silently would corrupt the
/// audit trail. The skip-feature flag instead routes picks to deterministic
/// scene-init answers, for modes that bypass player-driven features.
pub struct PlayerSelectionGenerator<G> {
    inner: G,
    selections: BTreeMap<String, PlayerSelection>,
    skip_feature: bool,
}

impl<G: DecisionGenerator> PlayerSelectionGenerator<G> {
    pub fn new(inner: G, selections: BTreeMap<String, PlayerSelection>) -> Self {
        Self {
            inner,
            selections,
            skip_feature: false,
        }
    }

    /// Route `pick_indexes` to scene-init answers instead of failing on
    /// missing contexts.
    pub fn with_skip_feature(mut self, skip_feature: bool) -> Self {
        self.skip_feature = skip_feature;
        self
    }
}

impl<G: DecisionGenerator> DecisionGenerator for PlayerSelectionGenerator<G> {
    fn get_decision(
        &mut self,
        true_weight: u64,
        false_weight: u64,
        context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        self.inner.get_decision(true_weight, false_weight, context)
    }

    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        self.inner
            .choose_indexes(index_count, pick_count, allow_duplicates, context)
    }

    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        self.inner
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
        self.inner
            .choose_weighted_with(index_count, weight_of, pick_count, allow_duplicates, context)
    }

    fn pick_indexes(
        &mut self,
        _index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        if self.skip_feature {
            return Ok(smallest_selection(min_count as usize, allow_duplicates));
        }
        let key = context.resolve();
        let Some(selection) = self.selections.get(key.as_ref()) else {
            return Err(GeneratorError::MissingSelection {
                context: key.into_owned(),
            });
        };
        let count = selection.indexes.len();
        if (count as u64) < min_count || (count as u64) > max_count {
            return Err(GeneratorError::SelectionCountOutOfRange {
                context: key.into_owned(),
                count,
                min: min_count,
                max: max_count,
            });
        }
        Ok(selection.indexes.clone())
    }
}
