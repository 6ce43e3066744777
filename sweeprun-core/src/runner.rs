//! Experiment orchestration, one algorithm run per parameter combination.

use crate::algorithm::{Algorithm, Invocation, IterationEvent};
use crate::config::SweepConfig;
use crate::error::SweepError;
use crate::persistence::{TableWriter, ensure_output_dir};
use crate::recorder::StateRecorder;
use crate::sweep::{ParameterCombination, SweepSpec};
use crate::table::Table;
use crate::value::{ParamValue, Value};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

pub const RUN_STATS_TABLE: &str = "run_stats_df";
pub const CURVES_TABLE: &str = "curves_df";

/// Tables produced by one sweep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepResults {
    pub run_stats: Table,
    pub curves: Table,
}

/// Drives a sweep of one algorithm over one problem.
pub struct ExperimentRunner<'p, P: ?Sized> {
    problem: &'p P,
    config: SweepConfig,
    extra_args: ParameterCombination,
    recorder: StateRecorder,
    runner_name: Option<String>,
}

impl<'p, P: ?Sized> ExperimentRunner<'p, P> {
    /// Validates `config` up front; no run starts with a bad configuration.
    pub fn new(problem: &'p P, config: SweepConfig) -> Result<Self, SweepError> {
        config.validate()?;
        let recorder = StateRecorder::new(&config.iteration_list, config.generate_curves)?;

        let mut extra_args = ParameterCombination::new();
        for (name, value) in &config.extra_args {
            extra_args.insert(name, ParamValue::Scalar(Value::from(value.clone())));
        }

        Ok(Self {
            problem,
            runner_name: config.runner_name.clone(),
            config,
            extra_args,
            recorder,
        })
    }

    /// Add a fixed argument passed to every run. Swept values override it.
    pub fn with_extra_arg(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.extra_args.insert(name, value.into());
        self
    }

    /// Replace the algorithm short name in logs and artifact names.
    pub fn set_runner_name(&mut self, name: &str) {
        self.runner_name = Some(name.to_string());
    }

    pub fn runner_name<A: Algorithm<P>>(&self, algorithm: &A) -> String {
        self.runner_name
            .clone()
            .unwrap_or_else(|| algorithm.short_name().to_string())
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn recorder(&self) -> &StateRecorder {
        &self.recorder
    }

    /// Run every combination of `sweep`, then build and persist the tables.
    ///
    /// An algorithm error aborts the whole sweep; results of combinations
    /// that already finished are discarded with it.
    pub fn run_experiment<A: Algorithm<P>>(
        &mut self,
        algorithm: &A,
        sweep: &SweepSpec,
    ) -> Result<SweepResults, SweepError> {
        self.recorder.clear();
        if let Some(dir) = &self.config.output_directory {
            ensure_output_dir(dir)?;
        }

        let expanded = sweep.expand();
        let runner_name = self.runner_name(algorithm);
        let max_iters = self.recorder.max_checkpoint();
        self.recorder
            .set_identity(&runner_name, &self.config.experiment_name);

        tracing::info!(
            runner = %runner_name,
            experiment = %self.config.experiment_name,
            combinations = expanded.combinations.len(),
            max_iters,
            "Running {runner_name}"
        );
        let sweep_start = Instant::now();
        for combination in &expanded.combinations {
            self.run_one(algorithm, combination, &expanded.display_names, max_iters)?;
        }
        tracing::info!(
            runner = %runner_name,
            elapsed_secs = sweep_start.elapsed().as_secs_f64(),
            "Run time"
        );

        let results = SweepResults {
            run_stats: Table::from_records(self.recorder.run_stats()),
            curves: Table::from_records(self.recorder.curves()),
        };
        self.persist(&runner_name, &results, &[])?;
        Ok(results)
    }

    fn run_one<A: Algorithm<P>>(
        &mut self,
        algorithm: &A,
        combination: &ParameterCombination,
        display_names: &HashMap<String, String>,
        max_iters: usize,
    ) -> Result<(), SweepError> {
        let total_args = combination.with_defaults(&self.extra_args);
        let user_info: Vec<(String, Value)> = total_args
            .iter()
            .map(|(name, value)| (name.to_string(), value.display_value()))
            .collect();
        let arg_text = total_args.to_string();

        self.recorder.begin_run(&total_args, display_names);
        tracing::info!("*** Run START - params: [{arg_text}]");

        let invocation = Invocation {
            max_iters,
            max_attempts: self.config.max_attempts,
            curve: self.config.generate_curves,
            seed: self.config.seed,
            rng: StdRng::seed_from_u64(self.config.seed),
            user_info: &user_info,
            params: &total_args,
        };

        let run_start = Instant::now();
        let recorder = &mut self.recorder;
        let outcome = algorithm
            .run(self.problem, invocation, &mut |event: IterationEvent<'_>| {
                recorder.on_iteration(event)
            })
            .map_err(|e| SweepError::algorithm(algorithm.short_name(), &arg_text, e))?;
        recorder.finish_run();

        tracing::info!(
            best_fitness = outcome.best_fitness,
            elapsed_secs = run_start.elapsed().as_secs_f64(),
            "*** Run END - params: [{arg_text}]"
        );
        tracing::debug!(best_state = ?outcome.best_state, "Best state");
        Ok(())
    }

    /// Write the primary tables and any `extra` tables when an output
    /// directory is configured. Returns every path written.
    pub fn persist(
        &self,
        runner_name: &str,
        results: &SweepResults,
        extra: &[(&str, &Table)],
    ) -> Result<Vec<PathBuf>, SweepError> {
        let Some(dir) = &self.config.output_directory else {
            return Ok(Vec::new());
        };
        let writer = TableWriter::new(dir, runner_name, &self.config.experiment_name);

        let mut written = Vec::new();
        written.extend(writer.write(RUN_STATS_TABLE, &results.run_stats)?);
        if self.config.generate_curves {
            written.extend(writer.write(CURVES_TABLE, &results.curves)?);
        }
        for (name, table) in extra {
            written.extend(writer.write(name, table)?);
        }
        Ok(written)
    }
}
