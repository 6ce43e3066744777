//! Random-restart hill climbing.

use super::flip_one;
use crate::algorithm::{Algorithm, AlgorithmOutcome, Invocation, IterationEvent, StateCallback};
use crate::error::AlgorithmError;
use crate::problems::DiscreteProblem;
use crate::value::Value;

/// Hill climbing with single-bit neighbors. After `max_attempts` consecutive
/// non-improving moves the search restarts from a random state, up to the
/// `restarts` option. Iterations are counted across restarts.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomHillClimb;

impl<P: DiscreteProblem + ?Sized> Algorithm<P> for RandomHillClimb {
    type State = Vec<u8>;

    fn short_name(&self) -> &str {
        "rhc"
    }

    fn run(
        &self,
        problem: &P,
        invocation: Invocation<'_>,
        callback: &mut StateCallback<'_>,
    ) -> Result<AlgorithmOutcome<Vec<u8>>, AlgorithmError> {
        let restarts = invocation.int_param("restarts", 0)?;
        let restarts = usize::try_from(restarts)
            .map_err(|_| format!("option 'restarts' must be non-negative, got {restarts}"))?;
        let Invocation {
            max_iters,
            max_attempts,
            curve: want_curve,
            mut rng,
            user_info,
            ..
        } = invocation;

        let mut user_data = user_info.to_vec();
        user_data.push(("current_restart".to_string(), Value::Int(0)));
        let restart_slot = user_data.len() - 1;

        let mut state = problem.random_state(&mut rng);
        let mut fitness = problem.fitness(&state);
        let mut best_state = state.clone();
        let mut best_fitness = fitness;
        let mut curve: Vec<f64> = Vec::new();

        let mut keep_going = callback(IterationEvent {
            iteration: 0,
            state: &state,
            fitness,
            user_data: &user_data,
            attempt: Some(0),
            done: max_iters == 0,
            curve: want_curve.then_some(curve.as_slice()),
        });

        let mut iteration = 0;
        let mut attempts = 0;
        let mut restart = 0;
        while keep_going && iteration < max_iters {
            iteration += 1;

            let neighbor = flip_one(&state, &mut rng);
            let neighbor_fitness = problem.fitness(&neighbor);
            if neighbor_fitness > fitness {
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

            let stalled = attempts >= max_attempts;
            let done = iteration >= max_iters || (stalled && restart >= restarts);
            keep_going = callback(IterationEvent {
                iteration,
                state: &state,
                fitness,
                user_data: &user_data,
                attempt: Some(attempts),
                done,
                curve: want_curve.then_some(curve.as_slice()),
            });

            if stalled && !done {
                restart += 1;
                user_data[restart_slot].1 = Value::Int(restart as i64);
                state = problem.random_state(&mut rng);
                fitness = problem.fitness(&state);
                attempts = 0;
                tracing::trace!(restart, iteration, "Restarting hill climb");
            }
        }

        Ok(AlgorithmOutcome {
            best_state,
            best_fitness,
            fitness_curve: want_curve.then_some(curve),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::OneMax;
    use crate::sweep::ParameterCombination;
    use crate::value::ParamValue;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn invocation<'a>(
        params: &'a ParameterCombination,
        max_iters: usize,
        max_attempts: usize,
    ) -> Invocation<'a> {
        Invocation {
            max_iters,
            max_attempts,
            curve: true,
            seed: 1,
            rng: StdRng::seed_from_u64(1),
            user_info: &[],
            params,
        }
    }

    #[test]
    fn test_reports_every_iteration_and_finishes_done() {
        let params = ParameterCombination::new();
        let mut seen = Vec::new();
        let outcome = RandomHillClimb
            .run(
                &OneMax::new(16),
                invocation(&params, 25, 1000),
                &mut |e: IterationEvent<'_>| {
                    seen.push((e.iteration, e.done, e.curve.map(<[f64]>::len)));
                    !e.done
                },
            )
            .unwrap();

        assert_eq!(seen.len(), 26);
        assert_eq!(seen[0], (0, false, Some(0)));
        assert_eq!(seen[25], (25, true, Some(25)));
        assert_eq!(outcome.fitness_curve.map(|c| c.len()), Some(25));
        assert!(outcome.best_fitness <= 16.0);
    }

    #[test]
    fn test_stalls_out_without_restarts() {
        let params = ParameterCombination::new();
        let mut last = 0;
        RandomHillClimb
            .run(
                &OneMax::new(4),
                invocation(&params, 10_000, 3),
                &mut |e: IterationEvent<'_>| {
                    last = e.iteration;
                    !e.done
                },
            )
            .unwrap();
        assert!(last < 10_000);
    }

    #[test]
    fn test_stops_when_callback_declines() {
        let params = ParameterCombination::new();
        let mut calls = 0;
        RandomHillClimb
            .run(
                &OneMax::new(8),
                invocation(&params, 100, 100),
                &mut |e: IterationEvent<'_>| {
                    calls += 1;
                    e.iteration < 3
                },
            )
            .unwrap();
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_negative_restarts_rejected() {
        let mut params = ParameterCombination::new();
        params.insert("restarts", ParamValue::from(-1i64));
        let result = RandomHillClimb.run(
            &OneMax::new(8),
            invocation(&params, 10, 10),
            &mut |e: IterationEvent<'_>| !e.done,
        );
        assert!(result.is_err());
    }
}
