//! Scene-init generator: deterministic placeholder answers.

use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};

/// Returns the lexicographically smallest valid answer for every call:
/// `false`, the first `pick_count` candidates, or an all-zero selection when
/// duplicates are allowed. Used to materialize a placeholder presentation
/// state before any real decision exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct SceneInitGenerator;

/// The smallest valid selection of `pick_count` indexes.
pub(crate) fn smallest_selection(pick_count: usize, allow_duplicates: bool) -> Vec<u64> {
    if allow_duplicates {
        vec![0; pick_count]
    } else {
        (0..pick_count as u64).collect()
    }
}

impl DecisionGenerator for SceneInitGenerator {
    fn get_decision(
        &mut self,
        _true_weight: u64,
        _false_weight: u64,
        _context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        Ok(false)
    }

    fn choose_indexes(
        &mut self,
        _index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        Ok(smallest_selection(pick_count, allow_duplicates))
    }

    fn choose_weighted(
        &mut self,
        _weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        Ok(smallest_selection(pick_count, allow_duplicates))
    }

    fn choose_weighted_with(
        &mut self,
        _index_count: u64,
        _weight_of: &dyn Fn(u64) -> u64,
        pick_count: usize,
        allow_duplicates: bool,
        _context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        Ok(smallest_selection(pick_count, allow_duplicates))
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
