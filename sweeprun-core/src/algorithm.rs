//! The boundary between the sweep engine and an iterative optimizer.

use crate::error::AlgorithmError;
use crate::sweep::ParameterCombination;
use crate::value::Value;
use rand::rngs::StdRng;
use std::fmt;

/// Progress reported by an algorithm once per iteration.
///
/// Iteration 0 is the initial state. The final call of a run has
/// `done == true`.
pub struct IterationEvent<'a> {
    pub iteration: usize,
    /// Current state; rendered only when the iteration is recorded.
    pub state: &'a dyn fmt::Debug,
    pub fitness: f64,
    pub user_data: &'a [(String, Value)],
    pub attempt: Option<usize>,
    pub done: bool,
    /// Fitness values for iterations `1..=n` so far, when curves are requested.
    pub curve: Option<&'a [f64]>,
}

impl fmt::Debug for IterationEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterationEvent")
            .field("iteration", &self.iteration)
            .field("fitness", &self.fitness)
            .field("attempt", &self.attempt)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Callback handed to algorithms. Returning `false` asks the algorithm to stop.
pub type StateCallback<'cb> = dyn FnMut(IterationEvent<'_>) -> bool + 'cb;

/// Everything an algorithm receives for one run besides the problem.
pub struct Invocation<'a> {
    pub max_iters: usize,
    pub max_attempts: usize,
    pub curve: bool,
    pub seed: u64,
    /// Generator seeded from `seed`, fresh for this run.
    pub rng: StdRng,
    pub user_info: &'a [(String, Value)],
    pub params: &'a ParameterCombination,
}

impl Invocation<'_> {
    pub fn param(&self, name: &str) -> Option<&crate::value::ParamValue> {
        self.params.get(name)
    }

    /// Integer option with a fallback when unset.
    pub fn int_param(&self, name: &str, default: i64) -> Result<i64, AlgorithmError> {
        match self.params.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_scalar()
                .and_then(Value::as_i64)
                .ok_or_else(|| format!("option '{name}' must be an integer, got {v}").into()),
        }
    }

    /// Float option with a fallback when unset.
    pub fn float_param(&self, name: &str, default: f64) -> Result<f64, AlgorithmError> {
        match self.params.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_scalar()
                .and_then(Value::as_f64)
                .ok_or_else(|| format!("option '{name}' must be numeric, got {v}").into()),
        }
    }
}

/// Best result of one run.
#[derive(Debug, Clone)]
pub struct AlgorithmOutcome<S> {
    pub best_state: S,
    pub best_fitness: f64,
    pub fitness_curve: Option<Vec<f64>>,
}

/// An iterative optimizer over problems of type `P`.
pub trait Algorithm<P: ?Sized> {
    type State: fmt::Debug;

    /// Short identity used in logs and as the default runner name.
    fn short_name(&self) -> &str;

    /// Run to completion, calling `callback` once per iteration and stopping
    /// when it returns `false` or the budgets in `invocation` are exhausted.
    fn run(
        &self,
        problem: &P,
        invocation: Invocation<'_>,
        callback: &mut StateCallback<'_>,
    ) -> Result<AlgorithmOutcome<Self::State>, AlgorithmError>;
}
