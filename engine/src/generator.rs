//! The decision-generator capability.
//!
//! Every source of decision outcomes (live RNG, stream replay, scene-init
//! placeholders, player-selection lookup, gaff authoring) implements
//! [`DecisionGenerator`]. The round driver picks an implementation per cycle
//! and composes decorators around it; variants never invoke each other except
//! by explicit composition.

use std::borrow::Cow;

/// Identifies a decision point for player-selection lookup and diagnostics.
///
/// Producing a formatted key can be expensive, so callers pass either a cheap
/// static key or a deferred closure. Generators that do not need the key must
/// not resolve it.
#[derive(Clone, Copy)]
pub enum DecisionContext<'a> {
    /// A key that already exists as a string.
    Key(&'a str),
    /// A key that needs formatting; invoked at most once per call, and only
    /// by variants that actually consume it.
    Deferred(&'a dyn Fn() -> String),
}

impl<'a> DecisionContext<'a> {
    /// Resolve the context into a string key.
    pub fn resolve(&self) -> Cow<'a, str> {
        match self {
            DecisionContext::Key(key) => Cow::Borrowed(key),
            DecisionContext::Deferred(f) => Cow::Owned(f()),
        }
    }
}

impl std::fmt::Debug for DecisionContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionContext::Key(key) => f.debug_tuple("Key").field(key).finish(),
            DecisionContext::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Error raised by a generator variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// A replayed stream ran out of values. The recorded stream and the
    /// decisions being replayed are out of sync; this is state corruption
    /// and must never be caught-and-continued.
    StreamExhausted { cursor: usize, len: usize },
    /// Player-selection lookup found no entry for a decision context.
    MissingSelection { context: String },
    /// A stored player selection's count falls outside the pick bounds.
    SelectionCountOutOfRange {
        context: String,
        count: usize,
        min: u64,
        max: u64,
    },
}

impl std::fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StreamExhausted { cursor, len } => {
                write!(f, "stream exhausted: cursor {cursor} past {len} values")
            }
            Self::MissingSelection { context } => {
                write!(f, "no player selection recorded for context {context:?}")
            }
            Self::SelectionCountOutOfRange {
                context,
                count,
                min,
                max,
            } => write!(
                f,
                "player selection for context {context:?} has {count} indexes, outside [{min}, {max}]"
            ),
        }
    }
}

impl std::error::Error for GeneratorError {}

/// A source of decision outcomes.
///
/// `choose_*` calls return realized indexes in pick order. Populations are
/// sized by the caller; requesting more distinct picks than the population
/// holds (with duplicates disallowed) is a caller contract violation and is
/// not re-validated here.
pub trait DecisionGenerator {
    /// Decide a weighted boolean.
    fn get_decision(
        &mut self,
        true_weight: u64,
        false_weight: u64,
        context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError>;

    /// Choose `pick_count` indexes from an unweighted population of
    /// `index_count` candidates.
    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError>;

    /// Choose `pick_count` indexes from a population weighted by a shared
    /// table; `weights.len()` is the population size.
    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError>;

    /// Choose `pick_count` indexes from a population of `index_count`
    /// candidates weighted by a per-call weight function.
    fn choose_weighted_with(
        &mut self,
        index_count: u64,
        weight_of: &dyn Fn(u64) -> u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError>;

    /// Choose a variable-count selection of `[min_count, max_count]` indexes
    /// from an unweighted population of `index_count` candidates.
    fn pick_indexes(
        &mut self,
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError>;
}

impl<G: DecisionGenerator + ?Sized> DecisionGenerator for &mut G {
    fn get_decision(
        &mut self,
        true_weight: u64,
        false_weight: u64,
        context: DecisionContext<'_>,
    ) -> Result<bool, GeneratorError> {
        (**self).get_decision(true_weight, false_weight, context)
    }

    fn choose_indexes(
        &mut self,
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        (**self).choose_indexes(index_count, pick_count, allow_duplicates, context)
    }

    fn choose_weighted(
        &mut self,
        weights: &[u64],
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        (**self).choose_weighted(weights, pick_count, allow_duplicates, context)
    }

    fn choose_weighted_with(
        &mut self,
        index_count: u64,
        weight_of: &dyn Fn(u64) -> u64,
        pick_count: usize,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        (**self).choose_weighted_with(index_count, weight_of, pick_count, allow_duplicates, context)
    }

    fn pick_indexes(
        &mut self,
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: DecisionContext<'_>,
    ) -> Result<Vec<u64>, GeneratorError> {
        (**self).pick_indexes(index_count, min_count, max_count, allow_duplicates, context)
    }
}
