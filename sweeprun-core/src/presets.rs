//! Named sweeps for the reference algorithms.
//!
//! Each preset maps its domain lists onto a [`SweepSpec`] and drives an
//! [`ExperimentRunner`] with the matching algorithm.

use crate::algorithms::{DecayKind, DecaySchedule, RandomHillClimb, SimulatedAnnealing};
use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::problems::DiscreteProblem;
use crate::runner::{ExperimentRunner, SweepResults};
use crate::sweep::SweepSpec;
use crate::value::ParamValue;

/// Random hill climbing over a list of restart counts.
#[derive(Debug, Clone)]
pub struct RhcRunner {
    pub config: SweepConfig,
    pub restart_list: Vec<usize>,
}

impl RhcRunner {
    pub fn new(config: SweepConfig, restart_list: Vec<usize>) -> Self {
        Self {
            config,
            restart_list,
        }
    }

    pub fn sweep(&self) -> SweepSpec {
        SweepSpec::new().option("restarts", "Restarts", self.restart_list.iter().copied())
    }

    pub fn run<P>(&self, problem: &P) -> Result<SweepResults, SweepError>
    where
        P: DiscreteProblem + ?Sized,
    {
        let mut runner = ExperimentRunner::new(problem, self.config.clone())?;
        runner.run_experiment(&RandomHillClimb, &self.sweep())
    }
}

/// Simulated annealing over every initial temperature and decay kind.
#[derive(Debug, Clone)]
pub struct SaRunner {
    pub config: SweepConfig,
    pub temperature_list: Vec<f64>,
    pub decay_list: Vec<DecayKind>,
}

impl SaRunner {
    pub fn new(
        config: SweepConfig,
        temperature_list: Vec<f64>,
        decay_list: Vec<DecayKind>,
    ) -> Self {
        Self {
            config,
            temperature_list,
            decay_list,
        }
    }

    /// One schedule per (temperature, decay) pair, temperature varying slowest.
    pub fn schedules(&self) -> Vec<DecaySchedule> {
        self.temperature_list
            .iter()
            .flat_map(|&temp| {
                self.decay_list
                    .iter()
                    .map(move |&kind| DecaySchedule::new(kind, temp))
            })
            .collect()
    }

    pub fn sweep(&self) -> SweepSpec {
        SweepSpec::new().option(
            "schedule",
            "Temperature",
            self.schedules().into_iter().map(ParamValue::component),
        )
    }

    /// Temperatures must be positive and finite.
    pub fn validate(&self) -> Result<(), SweepError> {
        if let Some(bad) = self
            .temperature_list
            .iter()
            .find(|t| !t.is_finite() || **t <= 0.0)
        {
            return Err(SweepError::invalid_parameter(
                "temperature_list",
                format!("initial temperature {bad} must be positive"),
            ));
        }
        Ok(())
    }

    pub fn run<P>(&self, problem: &P) -> Result<SweepResults, SweepError>
    where
        P: DiscreteProblem + ?Sized,
    {
        self.validate()?;
        let mut runner = ExperimentRunner::new(problem, self.config.clone())?;
        runner.run_experiment(&SimulatedAnnealing, &self.sweep())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problems::OneMax;
    use crate::recorder::ITERATION;
    use crate::value::Value;

    fn config() -> SweepConfig {
        SweepConfig {
            experiment_name: "preset".into(),
            iteration_list: vec![4, 8],
            max_attempts: 20,
            ..Default::default()
        }
    }

    #[test]
    fn test_rhc_runner_rows() {
        let results = RhcRunner::new(config(), vec![0, 2])
            .run(&OneMax::new(10))
            .unwrap();
        assert_eq!(results.run_stats.len(), 2 * 3);
        let restarts = results.run_stats.column("Restarts").unwrap();
        assert_eq!(restarts[0], Some(&Value::Int(0)));
        assert_eq!(restarts[5], Some(&Value::Int(2)));
        assert!(results.run_stats.column_index("current_restart").is_some());
    }

    #[test]
    fn test_sa_runner_schedule_product() {
        let preset = SaRunner::new(
            config(),
            vec![1.0, 10.0],
            vec![DecayKind::Geometric, DecayKind::Exponential],
        );
        assert_eq!(preset.schedules().len(), 4);

        let results = preset.run(&OneMax::new(10)).unwrap();
        assert_eq!(results.run_stats.len(), 4 * 3);
        let temps = results.run_stats.column("Temperature").unwrap();
        assert_eq!(temps[0], Some(&Value::from("1")));
        assert_eq!(temps[11], Some(&Value::from("10")));
        let kinds = results.run_stats.column("schedule_type").unwrap();
        assert_eq!(kinds[3], Some(&Value::from("exponential")));
        let iterations = results.run_stats.column(ITERATION).unwrap();
        assert_eq!(iterations[2], Some(&Value::Int(8)));
    }

    #[test]
    fn test_sa_runner_rejects_non_positive_temperature() {
        let preset = SaRunner::new(config(), vec![1.0, 0.0], vec![DecayKind::Geometric]);
        assert!(matches!(
            preset.run(&OneMax::new(4)),
            Err(SweepError::InvalidParameter { .. })
        ));
    }
}
