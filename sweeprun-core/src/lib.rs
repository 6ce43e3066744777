//! # sweeprun-core: hyperparameter sweeps for iterative optimizers
//!
//! Expands a set of candidate option values into every combination, runs an
//! [`Algorithm`] once per combination, and records checkpoint statistics and
//! fitness curves through a per-iteration callback.
//!
//! ## Flow
//!
//! 1. [`SweepSpec::expand`] builds the Cartesian product of option values.
//! 2. [`ExperimentRunner`] invokes the algorithm for each combination with a
//!    freshly seeded generator.
//! 3. [`StateRecorder`] filters iterations down to checkpoints and merges
//!    parameter, auxiliary and diagnostic fields into each row.
//! 4. [`Table`]s are built from the records and written as CSV and binary
//!    snapshots by [`persistence::TableWriter`].

// Engine
pub mod algorithm;
pub mod config;
pub mod error;
pub mod persistence;
pub mod record;
pub mod recorder;
pub mod runner;
pub mod sweep;
pub mod table;
pub mod value;

// Reference collaborators
pub mod algorithms;
pub mod presets;
pub mod problems;

// Re-exports
pub use algorithm::{Algorithm, AlgorithmOutcome, Invocation, IterationEvent, StateCallback};
pub use config::{ConfigOverrides, SweepConfig, load_config};
pub use error::{AlgorithmError, SweepError};
pub use presets::{RhcRunner, SaRunner};
pub use record::Record;
pub use recorder::StateRecorder;
pub use runner::{CURVES_TABLE, ExperimentRunner, RUN_STATS_TABLE, SweepResults};
pub use sweep::{ParameterCombination, SweepSpec};
pub use table::Table;
pub use value::{Diagnostics, ParamValue, SweepComponent, Value};
