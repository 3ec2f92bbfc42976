//! Gaff authoring generator.

use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};

/// Decorator used when authoring scripted outcomes: a single variable-count
/// `pick_indexes` becomes two fixed-arity sub-decisions against the inner
/// generator (first how many beyond the minimum, then the selection itself),
/// so an author-supplied number list can answer both with fixed arity.
///
/// Derived contexts are suffixed so each sub-decision keeps a unique key.
pub struct GaffAuthoringGenerator<G> {
    inner: G,
}

impl<G: DecisionGenerator> GaffAuthoringGenerator<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: DecisionGenerator> DecisionGenerator for GaffAuthoringGenerator<G> {
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
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        let base = context.resolve();

        let count_key = format!("{base}#count");
        let span = max_count - min_count + 1;
        // The inner generator answers freely; keep the count within bounds.
        let extra = self
            .inner
            .choose_indexes(span, 1, true, DecisionContext::Key(&count_key))?[0]
            .min(span - 1);
        let count = min_count + extra;

        let picks_key = format!("{base}#picks");
        self.inner.choose_indexes(
            index_count,
            count as usize,
            allow_duplicates,
            DecisionContext::Key(&picks_key),
        )
    }
}
