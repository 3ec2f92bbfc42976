//! Gaff stream materialization.
//!
//! Authoring tools describe a scripted cycle as a flat list of numbers, one
//! per fixed-arity sub-decision. Materialization runs the rule engine once
//! over that list and captures the canonical encoding of every realized
//! value, yielding a stream suitable for [`RoundDriver::inject_gaff`]
//! (variable-count picks included, since the authoring decorator splits them
//! the same way the encoder counts them).
//!
//! [`RoundDriver::inject_gaff`]: crate::round_driver::RoundDriver::inject_gaff

use crate::generator::{DecisionGenerator, GeneratorError};
use crate::generators::{GaffAuthoringGenerator, StreamReplayGenerator};
use crate::recorder::RecordingGenerator;
use crate::round_driver::CycleEvaluator;
use tracing::warn;

/// Convert an author's number list into a canonical decision stream by
/// evaluating one cycle against it. Returns the stream and the outcome the
/// evaluator produced, so the author can confirm the script does what was
/// intended.
///
/// Too few numbers for the evaluator's decisions is an error; unused
/// trailing numbers are reported and dropped.
pub fn materialize<E: CycleEvaluator>(
    evaluator: &mut E,
    numbers: Vec<u64>,
) -> Result<(Vec<u64>, E::Outcome), GeneratorError> {
    let mut source = StreamReplayGenerator::new(numbers);
    let (stream, outcome) = materialize_with(evaluator, &mut source)?;
    if source.remaining() > 0 {
        warn!(
            consumed = source.consumed(),
            unused = source.remaining(),
            "authored number list longer than the evaluated cycle"
        );
    }
    Ok((stream, outcome))
}

/// Materialize against an arbitrary number source. Useful for authoring
/// tools that answer sub-decisions interactively instead of from a list.
pub fn materialize_with<E, G>(
    evaluator: &mut E,
    source: G,
) -> Result<(Vec<u64>, E::Outcome), GeneratorError>
where
    E: CycleEvaluator,
    G: DecisionGenerator,
{
    let author = GaffAuthoringGenerator::new(source);
    let mut recorder = RecordingGenerator::new(Box::new(author));
    let outcome = evaluator.evaluate(&mut recorder)?;
    Ok((recorder.into_log(), outcome))
}
