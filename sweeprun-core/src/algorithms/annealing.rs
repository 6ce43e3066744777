//! Simulated annealing driven by a [`DecaySchedule`].

use super::flip_one;
use super::schedule::DecaySchedule;
use crate::algorithm::{Algorithm, AlgorithmOutcome, Invocation, IterationEvent, StateCallback};
use crate::error::AlgorithmError;
use crate::problems::DiscreteProblem;
use rand::Rng;

/// Simulated annealing with single-bit neighbors.
///
/// The temperature comes from the `schedule` option, evaluated at the
/// iteration number. Worse neighbors are accepted with probability
/// `exp(delta / T)`. The run ends after `max_attempts` consecutive rejected
/// moves or at `max_iters`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAnnealing;

impl SimulatedAnnealing {
    fn schedule(invocation: &Invocation<'_>) -> Result<DecaySchedule, AlgorithmError> {
        match invocation.param("schedule") {
            None => Ok(DecaySchedule::default()),
            Some(value) => value.downcast::<DecaySchedule>().cloned().ok_or_else(|| {
                format!("option 'schedule' must be a decay schedule, got {value}").into()
            }),
        }
    }
}

impl<P: DiscreteProblem + ?Sized> Algorithm<P> for SimulatedAnnealing {
    type State = Vec<u8>;

    fn short_name(&self) -> &str {
        "sa"
    }

    fn run(
        &self,
        problem: &P,
        invocation: Invocation<'_>,
        callback: &mut StateCallback<'_>,
    ) -> Result<AlgorithmOutcome<Vec<u8>>, AlgorithmError> {
        let schedule = Self::schedule(&invocation)?;
        let Invocation {
            max_iters,
            max_attempts,
            curve: want_curve,
            mut rng,
            user_info,
            ..
        } = invocation;

        let mut state = problem.random_state(&mut rng);
        let mut fitness = problem.fitness(&state);
        let mut best_state = state.clone();
        let mut best_fitness = fitness;
        let mut curve: Vec<f64> = Vec::new();

        let mut keep_going = callback(IterationEvent {
            iteration: 0,
            state: &state,
            fitness,
            user_data: user_info,
            attempt: Some(0),
            done: max_iters == 0,
            curve: want_curve.then_some(curve.as_slice()),
        });

        let mut iteration = 0;
        let mut attempts = 0;
        while keep_going && iteration < max_iters {
            let temp = schedule.evaluate(iteration as f64);
            iteration += 1;

            let neighbor = flip_one(&state, &mut rng);
            let neighbor_fitness = problem.fitness(&neighbor);
            let delta = neighbor_fitness - fitness;
            if delta > 0.0 || rng.r#gen::<f64>() < (delta / temp).exp() {
                state = neighbor;
                fitness = neighbor_fitness;
                attempts = 0;
            } else {
                attempts += 1;
            }
            if fitness > best_fitness {
                best_fitness = fitness;
                best_state.clone_from(&state);
            }
            if want_curve {
                curve.push(fitness);
            }

            keep_going = callback(IterationEvent {
                iteration,
                state: &state,
                fitness,
                user_data: user_info,
                attempt: Some(attempts),
                done: iteration >= max_iters || attempts >= max_attempts,
                curve: want_curve.then_some(curve.as_slice()),
            });
            if attempts >= max_attempts {
                break;
            }
        }

        Ok(AlgorithmOutcome {
            best_state,
            best_fitness,
            fitness_curve: want_curve.then_some(curve),
        })
    }
}
