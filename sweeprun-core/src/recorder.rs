//! Per-iteration state recording: checkpoint statistics and fitness curves.
//!
//! The recorder is bound into every algorithm run as its iteration callback.
//! Filtered iterations only log their elapsed time; checkpoint and terminal
//! iterations build a merged display record which is fanned out to the
//! checkpoints it satisfies.

use crate::algorithm::IterationEvent;
use crate::error::SweepError;
use crate::record::{Record, merge_display_record};
use crate::sweep::ParameterCombination;
use crate::value::Value;
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

pub const ITERATION: &str = "Iteration";
pub const FITNESS: &str = "Fitness";
pub const TIME: &str = "Time";
pub const STATE: &str = "State";

/// Callback-driven collector of run statistics and curves for a whole sweep.
#[derive(Debug)]
pub struct StateRecorder {
    checkpoints: BTreeSet<usize>,
    max_checkpoint: usize,
    generate_curves: bool,
    runner_name: String,
    experiment_name: String,

    // Per-run state, reset by `begin_run`.
    active: ParameterCombination,
    param_record: Record,
    run_start: Instant,
    iteration_times: Vec<Option<f64>>,
    pending: BTreeSet<usize>,
    zero_curve_point: Option<Record>,
    curve_emitted: bool,
    last_row: Option<Record>,

    // Sweep-wide accumulation.
    run_stats: Vec<Record>,
    curves: Vec<Record>,
}

impl StateRecorder {
    pub fn new(checkpoints: &[usize], generate_curves: bool) -> Result<Self, SweepError> {
        let checkpoints: BTreeSet<usize> = checkpoints.iter().copied().collect();
        let max_checkpoint = *checkpoints
            .last()
            .ok_or_else(|| SweepError::config("checkpoint set must not be empty"))?;

        Ok(Self {
            checkpoints,
            max_checkpoint,
            generate_curves,
            runner_name: String::new(),
            experiment_name: String::new(),
            active: ParameterCombination::new(),
            param_record: Record::new(),
            run_start: Instant::now(),
            iteration_times: Vec::new(),
            pending: BTreeSet::new(),
            zero_curve_point: None,
            curve_emitted: false,
            last_row: None,
            run_stats: Vec::new(),
            curves: Vec::new(),
        })
    }

    /// Names attached to log lines.
    pub fn set_identity(&mut self, runner_name: &str, experiment_name: &str) {
        self.runner_name = runner_name.to_string();
        self.experiment_name = experiment_name.to_string();
    }

    pub fn max_checkpoint(&self) -> usize {
        self.max_checkpoint
    }

    /// Drop everything accumulated so far, including completed runs.
    pub fn clear(&mut self) {
        self.run_stats.clear();
        self.curves.clear();
        self.reset_run();
        self.active = ParameterCombination::new();
        self.param_record = Record::new();
    }

    /// Prepare for a new run with `params` active. Starts the run clock.
    pub fn begin_run(
        &mut self,
        params: &ParameterCombination,
        display_names: &HashMap<String, String>,
    ) {
        self.reset_run();
        self.active = params.clone();
        self.param_record = params
            .iter()
            .map(|(name, value)| {
                let label = display_names.get(name).map(String::as_str).unwrap_or(name);
                (label.to_string(), value.display_value())
            })
            .collect();
        self.run_start = Instant::now();
    }

    fn reset_run(&mut self) {
        self.iteration_times.clear();
        self.pending = self.checkpoints.clone();
        self.pending.insert(0);
        self.zero_curve_point = None;
        self.curve_emitted = false;
        self.last_row = None;
    }

    /// The iteration callback. Returns `false` once the algorithm reports done.
    pub fn on_iteration(&mut self, event: IterationEvent<'_>) -> bool {
        let t = self.run_start.elapsed().as_secs_f64();
        self.log_time(event.iteration, t);

        if event.iteration > 0 && !event.done && !self.checkpoints.contains(&event.iteration) {
            return true;
        }

        let diagnostics: Vec<Record> = self
            .active
            .iter()
            .filter_map(|(_, value)| value.diagnostics())
            .map(|d| d.diagnostics(t))
            .collect();
        let context = merge_display_record(&self.param_record, event.user_data, diagnostics);

        tracing::info!(
            runner = %self.runner_name,
            experiment = %self.experiment_name,
            attempt = ?event.attempt,
            iteration = event.iteration,
            done = event.done,
            time = format_args!("{t:.2}"),
            fitness = format_args!("{:.4}", event.fitness),
            "Recorded iteration"
        );

        let rendered_state = format!("{:?}", event.state);
        tracing::debug!(state = %rendered_state, context = ?context, "Iteration state");

        let mut row = Record::with_capacity(context.len() + 4);
        row.insert(ITERATION, event.iteration);
        row.insert(FITNESS, event.fitness);
        row.insert(TIME, t);
        row.insert(STATE, rendered_state);
        row.extend(context.clone());

        for checkpoint in self.fan_out_targets(event.iteration, event.done) {
            self.pending.remove(&checkpoint);
            let mut stored = row.clone();
            stored.insert(ITERATION, checkpoint);
            self.run_stats.push(stored);
        }
        self.last_row = Some(row);

        if self.generate_curves {
            if event.iteration == 0 {
                self.zero_curve_point = Some(curve_point(0, t, event.fitness, &context));
            }
            if let Some(curve) = event.curve
                && !self.curve_emitted
                && (event.done || event.iteration == self.max_checkpoint)
            {
                self.emit_curve(curve, &context);
            }
        }

        !event.done
    }

    /// Checkpoints a recorded iteration is stored under.
    ///
    /// Not done: only the smallest checkpoint at or above the iteration, which
    /// for an unfiltered iteration is the iteration itself. Done: every
    /// pending checkpoint at or above the iteration.
    fn fan_out_targets(&self, iteration: usize, done: bool) -> Vec<usize> {
        if done {
            return self.pending.range(iteration..).copied().collect();
        }
        if iteration == 0 {
            return self.pending.contains(&0).then_some(0).into_iter().collect();
        }
        self.checkpoints
            .range(iteration..)
            .next()
            .copied()
            .filter(|c| self.pending.contains(c))
            .into_iter()
            .collect()
    }

    fn emit_curve(&mut self, curve: &[f64], context: &Record) {
        self.curve_emitted = true;
        self.curves.reserve(curve.len() + 1);
        match self.zero_curve_point.take() {
            Some(zero) => self.curves.push(zero),
            None => tracing::warn!(
                runner = %self.runner_name,
                "No iteration 0 callback seen; curve has no initial point"
            ),
        }
        for (i, fitness) in curve.iter().enumerate() {
            let iteration = i + 1;
            let t = self.time_at(iteration);
            self.curves.push(curve_point(iteration, t, *fitness, context));
        }
    }

    fn log_time(&mut self, iteration: usize, t: f64) {
        if iteration >= self.iteration_times.len() {
            self.iteration_times.resize(iteration + 1, None);
        }
        self.iteration_times[iteration] = Some(t);
    }

    /// Elapsed time logged for `iteration`, or the latest earlier one.
    fn time_at(&self, iteration: usize) -> f64 {
        let upto = iteration.min(self.iteration_times.len().saturating_sub(1));
        self.iteration_times
            .get(..=upto)
            .and_then(|times| times.iter().rev().find_map(|t| *t))
            .unwrap_or(0.0)
    }

    /// Close the current run. Checkpoints the algorithm never reached because
    /// it returned without a done callback are filled from the last row.
    pub fn finish_run(&mut self) {
        let missing: Vec<usize> = self
            .pending
            .iter()
            .copied()
            .filter(|c| self.checkpoints.contains(c))
            .collect();
        if missing.is_empty() {
            return;
        }

        tracing::warn!(
            runner = %self.runner_name,
            experiment = %self.experiment_name,
            missing = ?missing,
            "Algorithm returned without a done callback; filling remaining checkpoints"
        );

        let base = self.last_row.clone().unwrap_or_else(|| {
            let mut row = Record::new();
            row.insert(ITERATION, 0usize);
            row.insert(FITNESS, Value::Null);
            row.insert(TIME, self.run_start.elapsed().as_secs_f64());
            row.insert(STATE, Value::Null);
            row.extend(self.param_record.clone());
            row
        });
        for checkpoint in missing {
            self.pending.remove(&checkpoint);
            let mut stored = base.clone();
            stored.insert(ITERATION, checkpoint);
            self.run_stats.push(stored);
        }
    }

    pub fn run_stats(&self) -> &[Record] {
        &self.run_stats
    }

    pub fn curves(&self) -> &[Record] {
        &self.curves
    }
}

fn curve_point(iteration: usize, t: f64, fitness: f64, context: &Record) -> Record {
    let mut point = Record::with_capacity(context.len() + 3);
    point.insert(ITERATION, iteration);
    point.insert(TIME, t);
    point.insert(FITNESS, fitness);
    point.extend(context.clone());
    point
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::value::{Diagnostics, ParamValue, SweepComponent};
    use std::any::Any;

    fn event<'a>(
        iteration: usize,
        fitness: f64,
        user_data: &'a [(String, Value)],
        done: bool,
        curve: Option<&'a [f64]>,
    ) -> IterationEvent<'a> {
        IterationEvent {
            iteration,
            state: &"s",
            fitness,
            user_data,
            attempt: Some(0),
            done,
            curve,
        }
    }

    fn recorder(checkpoints: &[usize], curves: bool) -> StateRecorder {
        let mut r = StateRecorder::new(checkpoints, curves).unwrap();
        r.begin_run(&ParameterCombination::new(), &HashMap::new());
        r
    }

    fn iterations(rows: &[Record]) -> Vec<i64> {
        rows.iter()
            .filter_map(|r| r.get(ITERATION).and_then(Value::as_i64))
            .collect()
    }

    #[test]
    fn test_empty_checkpoints_rejected() {
        assert!(matches!(
            StateRecorder::new(&[], true),
            Err(SweepError::Config(_))
        ));
    }

    #[test]
    fn test_only_checkpoints_recorded() {
        let mut r = recorder(&[5, 10], false);
        for i in 0..=10 {
            assert!(r.on_iteration(event(i, i as f64, &[], false, None)));
        }
        assert!(!r.on_iteration(event(10, 10.0, &[], true, None)));
        assert_eq!(iterations(r.run_stats()), vec![0, 5, 10]);
    }

    #[test]
    fn test_done_fans_out_to_remaining_checkpoints() {
        let mut r = recorder(&[5, 10, 20], false);
        for i in 0..=5 {
            r.on_iteration(event(i, i as f64, &[], false, None));
        }
        r.on_iteration(event(6, 6.0, &[], false, None));
        assert!(!r.on_iteration(event(7, 7.0, &[], true, None)));

        let rows = r.run_stats();
        assert_eq!(iterations(rows), vec![0, 5, 10, 20]);
        assert_eq!(rows[1].get(FITNESS), Some(&Value::Float(5.0)));
        assert_eq!(rows[2].get(FITNESS), Some(&Value::Float(7.0)));
        assert_eq!(rows[3].get(FITNESS), Some(&Value::Float(7.0)));
        assert_eq!(rows[2].get(TIME), rows[3].get(TIME));
    }

    #[test]
    fn test_checkpoint_not_duplicated_by_terminal_call() {
        let mut r = recorder(&[3], false);
        for i in 0..=3 {
            r.on_iteration(event(i, 1.0, &[], false, None));
        }
        r.on_iteration(event(3, 1.0, &[], true, None));
        assert_eq!(iterations(r.run_stats()), vec![0, 3]);
    }

    #[test]
    fn test_zero_checkpoint_only_initial_row() {
        let mut r = recorder(&[0], false);
        r.on_iteration(event(0, 2.0, &[], false, None));
        r.on_iteration(event(1, 3.0, &[], false, None));
        r.on_iteration(event(2, 4.0, &[], true, None));
        assert_eq!(iterations(r.run_stats()), vec![0]);
        assert_eq!(r.run_stats()[0].get(FITNESS), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_curve_has_initial_point_and_one_per_value() {
        let mut r = recorder(&[4], true);
        let fitness = [1.0, 2.0, 3.0];
        r.on_iteration(event(0, 0.0, &[], false, Some(&[][..])));
        for i in 1..=3 {
            r.on_iteration(event(i, fitness[i - 1], &[], false, Some(&fitness[..i])));
        }
        r.on_iteration(event(3, 3.0, &[], true, Some(&fitness[..])));

        let curve = r.curves();
        assert_eq!(iterations(curve), vec![0, 1, 2, 3]);
        let times: Vec<f64> = curve
            .iter()
            .filter_map(|p| p.get(TIME).and_then(Value::as_f64))
            .collect();
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(curve[2].get(FITNESS), Some(&Value::Float(2.0)));
    }

    #[test]
    fn test_curve_emitted_once_at_max_checkpoint() {
        let mut r = recorder(&[2], true);
        let fitness = [5.0, 6.0];
        r.on_iteration(event(0, 4.0, &[], false, Some(&[][..])));
        r.on_iteration(event(1, 5.0, &[], false, Some(&fitness[..1])));
        r.on_iteration(event(2, 6.0, &[], false, Some(&fitness[..])));
        r.on_iteration(event(2, 6.0, &[], true, Some(&fitness[..])));
        assert_eq!(r.curves().len(), 3);
    }

    #[test]
    fn test_no_curve_without_sequence() {
        let mut r = recorder(&[2], true);
        r.on_iteration(event(0, 1.0, &[], false, None));
        r.on_iteration(event(2, 1.0, &[], true, None));
        assert!(r.curves().is_empty());
    }

    #[test]
    fn test_begin_run_resets_per_run_state() {
        let mut r = recorder(&[1], true);
        r.on_iteration(event(0, 1.0, &[], false, None));
        r.on_iteration(event(1, 1.0, &[], true, Some(&[1.0][..])));
        assert_eq!(r.curves().len(), 2);

        r.begin_run(&ParameterCombination::new(), &HashMap::new());
        r.on_iteration(event(0, 9.0, &[], false, None));
        r.on_iteration(event(1, 9.0, &[], true, Some(&[9.0][..])));
        assert_eq!(iterations(r.run_stats()), vec![0, 1, 0, 1]);
        assert_eq!(r.curves().len(), 4);
    }

    #[test]
    fn test_elapsed_time_resets_per_run() {
        let mut r = recorder(&[3], true);
        let fitness = [1.0, 2.0, 3.0];
        r.on_iteration(event(0, 0.0, &[], false, Some(&[][..])));
        std::thread::sleep(std::time::Duration::from_millis(20));
        for i in 1..=3 {
            r.on_iteration(event(i, fitness[i - 1], &[], i == 3, Some(&fitness[..i])));
        }

        r.begin_run(&ParameterCombination::new(), &HashMap::new());
        r.on_iteration(event(0, 0.0, &[], false, Some(&[][..])));
        r.on_iteration(event(3, 3.0, &[], true, Some(&fitness[..])));

        let times: Vec<f64> = r
            .run_stats()
            .iter()
            .filter_map(|row| row.get(TIME).and_then(Value::as_f64))
            .collect();
        assert_eq!(times.len(), 4);
        assert!(times[1] >= 0.02);
        assert!(times[2] < times[1]);

        let curve_times: Vec<f64> = r
            .curves()
            .iter()
            .filter_map(|p| p.get(TIME).and_then(Value::as_f64))
            .collect();
        assert_eq!(curve_times.len(), 8);
        assert!(curve_times[4] < curve_times[3]);
    }

    #[test]
    fn test_finish_run_fills_unreached_checkpoints() {
        let mut r = recorder(&[5, 50], false);
        for i in 0..=6 {
            r.on_iteration(event(i, i as f64, &[], false, None));
        }
        r.finish_run();
        let rows = r.run_stats();
        assert_eq!(iterations(rows), vec![0, 5, 50]);
        assert_eq!(rows[2].get(FITNESS), Some(&Value::Float(5.0)));
    }

    #[derive(Debug)]
    struct Schedule;

    impl Diagnostics for Schedule {
        fn diagnostics(&self, _elapsed_secs: f64) -> Record {
            [("schedule_type", Value::from("test")), ("Temp", Value::from(1.5))]
                .into_iter()
                .collect()
        }
    }

    impl SweepComponent for Schedule {
        fn short_name(&self) -> String {
            "sched".into()
        }

        fn diagnostics(&self) -> Option<&dyn Diagnostics> {
            Some(self)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_row_merges_params_user_data_and_diagnostics() {
        let mut params = ParameterCombination::new();
        params.insert("schedule", ParamValue::component(Schedule));
        params.insert("restarts", 3i64.into());
        let display: HashMap<String, String> = [
            ("schedule".to_string(), "Temp".to_string()),
            ("restarts".to_string(), "Restarts".to_string()),
        ]
        .into_iter()
        .collect();

        let mut r = StateRecorder::new(&[1], false).unwrap();
        r.begin_run(&params, &display);
        let user = vec![
            ("RESTARTS".to_string(), Value::Int(100)),
            ("current_restart".to_string(), Value::Int(0)),
        ];
        r.on_iteration(event(0, 1.0, &user, false, None));

        let row = &r.run_stats()[0];
        assert_eq!(row.get("Restarts"), Some(&Value::Int(3)));
        assert!(!row.contains_key("RESTARTS"));
        assert_eq!(row.get("current_restart"), Some(&Value::Int(0)));
        assert_eq!(row.get("schedule_type"), Some(&Value::from("test")));
        // diagnostics win over the parameter column
        assert_eq!(row.get("Temp"), Some(&Value::Float(1.5)));
        assert_eq!(row.get(STATE), Some(&Value::from("\"s\"")));
    }
}
