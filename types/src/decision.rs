//! The decision data model.
//!
//! A [`Decision`] is one realized choice made during rule evaluation: a
//! definition describing the population it was drawn from, plus the realized
//! result. Decisions are immutable once created and are consumed exactly once
//! by the stream encoder.

use thiserror::Error;

/// Definition of a decision point, discriminated by kind.
///
/// The two weighted variants differ only in how the per-index weight was
/// supplied at decision time (shared table vs. per-call weight function);
/// by the time a [`Decision`] is built both carry a materialized table and
/// share identical encoding rules.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionDef {
    /// Boolean outcome. `true_weight` is only consulted when translating the
    /// result to and from canonical stream values.
    Simple { true_weight: u64 },
    /// One or more indexes drawn from a weighted population described by a
    /// shared weights table.
    WeightsIndexes {
        weights: Vec<u64>,
        allow_duplicates: bool,
    },
    /// One or more indexes drawn from a weighted population whose weights
    /// were produced by a per-call weight function, materialized here.
    WeightedIndexes {
        weights: Vec<u64>,
        allow_duplicates: bool,
    },
    /// One or more indexes drawn from an unweighted population of
    /// `index_count` candidates.
    Indexes {
        index_count: u64,
        allow_duplicates: bool,
    },
    /// A variable-count selection of `[min_count, max_count]` indexes from an
    /// unweighted population. The realized count (minus `min_count`) is part
    /// of the encoded stream.
    PickIndexes {
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
    },
}

/// The realized value of a decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecisionResult {
    Flag(bool),
    Indexes(Vec<u64>),
}

/// A realized decision: definition plus result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decision {
    def: DecisionDef,
    result: DecisionResult,
}

/// Mismatch between a decision definition and its claimed result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("simple decision requires a flag result")]
    ExpectedFlag,
    #[error("index decision requires an index-sequence result")]
    ExpectedIndexes,
    #[error("realized count {count} outside [{min}, {max}]")]
    CountOutOfRange { count: usize, min: u64, max: u64 },
}

impl Decision {
    /// Build a decision, validating that the result shape matches the
    /// definition kind and, for variable-count picks, that the realized
    /// count lies within `[min_count, max_count]`.
    pub fn new(def: DecisionDef, result: DecisionResult) -> Result<Self, DecisionError> {
        match (&def, &result) {
            (DecisionDef::Simple { .. }, DecisionResult::Flag(_)) => {}
            (DecisionDef::Simple { .. }, _) => return Err(DecisionError::ExpectedFlag),
            (
                DecisionDef::PickIndexes {
                    min_count,
                    max_count,
                    ..
                },
                DecisionResult::Indexes(indexes),
            ) => {
                let count = indexes.len();
                if (count as u64) < *min_count || (count as u64) > *max_count {
                    return Err(DecisionError::CountOutOfRange {
                        count,
                        min: *min_count,
                        max: *max_count,
                    });
                }
            }
            (_, DecisionResult::Indexes(_)) => {}
            (_, DecisionResult::Flag(_)) => return Err(DecisionError::ExpectedIndexes),
        }
        Ok(Self { def, result })
    }

    pub fn def(&self) -> &DecisionDef {
        &self.def
    }

    pub fn result(&self) -> &DecisionResult {
        &self.result
    }
}

impl DecisionDef {
    /// Number of canonical stream values an encoding of this decision
    /// produces, given the realized result. Depends only on the definition
    /// parameters and the realized count, never on the numeric values.
    pub fn stream_arity(&self, result: &DecisionResult) -> usize {
        match (self, result) {
            (DecisionDef::Simple { .. }, _) => 1,
            (DecisionDef::PickIndexes { .. }, DecisionResult::Indexes(indexes)) => {
                1 + indexes.len()
            }
            (_, DecisionResult::Indexes(indexes)) => indexes.len(),
            (_, DecisionResult::Flag(_)) => 1,
        }
    }
}
