//! Test doubles for the external collaborators.

use crate::generator::{DecisionContext, DecisionGenerator, GeneratorError};
use crate::rng::RngSource;
use crate::round_driver::CycleEvaluator;

/// An [`RngSource`] that replays a fixed value list, cycling when it runs
/// out. Handy for forcing specific live-generator outcomes.
pub struct FixedRng {
    values: Vec<u64>,
    cursor: usize,
}

impl FixedRng {
    pub fn new(values: Vec<u64>) -> Self {
        assert!(!values.is_empty(), "FixedRng needs at least one value");
        Self { values, cursor: 0 }
    }
}

impl RngSource for FixedRng {
    fn next_u64(&mut self) -> u64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// One generator call in a scripted rule sequence.
#[derive(Clone, Debug)]
pub enum ScriptedCall {
    Decision {
        true_weight: u64,
        false_weight: u64,
    },
    Choose {
        index_count: u64,
        pick_count: usize,
        allow_duplicates: bool,
    },
    ChooseWeighted {
        weights: Vec<u64>,
        pick_count: usize,
        allow_duplicates: bool,
    },
    Pick {
        index_count: u64,
        min_count: u64,
        max_count: u64,
        allow_duplicates: bool,
        context: String,
    },
}

/// A stand-in rule engine: issues a fixed call sequence against whatever
/// generator it is handed and reports the flattened realized values as its
/// outcome. Re-runnable, so a gaff trial can be retried live.
pub struct ScriptedEvaluator {
    calls: Vec<ScriptedCall>,
}

impl ScriptedEvaluator {
    pub fn new(calls: Vec<ScriptedCall>) -> Self {
        Self { calls }
    }
}

impl CycleEvaluator for ScriptedEvaluator {
    type Outcome = Vec<u64>;

    fn evaluate(
        &mut self,
        generator: &mut dyn DecisionGenerator,
    ) -> Result<Self::Outcome, GeneratorError> {
        let mut trace = Vec::new();
        for call in &self.calls {
            match call {
                ScriptedCall::Decision {
                    true_weight,
                    false_weight,
                } => {
                    let flag = generator.get_decision(
                        *true_weight,
                        *false_weight,
                        DecisionContext::Key("scripted:flag"),
                    )?;
                    trace.push(flag as u64);
                }
                ScriptedCall::Choose {
                    index_count,
                    pick_count,
                    allow_duplicates,
                } => {
                    let picks = generator.choose_indexes(
                        *index_count,
                        *pick_count,
                        *allow_duplicates,
                        DecisionContext::Key("scripted:choose"),
                    )?;
                    trace.extend(picks);
                }
                ScriptedCall::ChooseWeighted {
                    weights,
                    pick_count,
                    allow_duplicates,
                } => {
                    let picks = generator.choose_weighted(
                        weights,
                        *pick_count,
                        *allow_duplicates,
                        DecisionContext::Key("scripted:weighted"),
                    )?;
                    trace.extend(picks);
                }
                ScriptedCall::Pick {
                    index_count,
                    min_count,
                    max_count,
                    allow_duplicates,
                    context,
                } => {
                    let picks = generator.pick_indexes(
                        *index_count,
                        *min_count,
                        *max_count,
                        *allow_duplicates,
                        DecisionContext::Key(context),
                    )?;
                    trace.push(picks.len() as u64);
                    trace.extend(picks);
                }
            }
        }
        Ok(trace)
    }
}
