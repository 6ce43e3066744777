//! Subcommand handlers.

use crate::{Commands, ProblemKind};
use sweeprun_core::problems::{DiscreteProblem, FourPeaks, OneMax};
use sweeprun_core::recorder::{FITNESS, ITERATION, STATE, TIME};
use sweeprun_core::{RhcRunner, SaRunner, SweepConfig, SweepResults, Table, Value};

pub(crate) fn build_problem(
    kind: ProblemKind,
    length: usize,
    t_pct: f64,
) -> anyhow::Result<Box<dyn DiscreteProblem>> {
    if length == 0 {
        anyhow::bail!("--length must be at least 1");
    }
    Ok(match kind {
        ProblemKind::Onemax => Box::new(OneMax::new(length)),
        ProblemKind::Fourpeaks => Box::new(FourPeaks::new(length, t_pct)),
    })
}

pub(crate) fn handle_command(
    command: Commands,
    config: SweepConfig,
    problem: &dyn DiscreteProblem,
) -> anyhow::Result<()> {
    let max_iters = config.max_iterations();
    let output = config.output_directory.clone();

    let results = match command {
        Commands::Rhc { restarts } => RhcRunner::new(config, restarts).run(problem)?,
        Commands::Sa {
            temperatures,
            decays,
        } => SaRunner::new(config, temperatures, decays).run(problem)?,
    };

    print_summary(problem.name(), &results, max_iters);
    match output {
        Some(dir) => println!("\n  Tables written to {}", dir.display()),
        None => println!("\n  No output directory configured; nothing written."),
    }
    Ok(())
}

fn print_summary(problem: &str, results: &SweepResults, max_iters: usize) {
    println!(
        "\n  {}: {} statistics rows, {} curve points\n",
        problem,
        results.run_stats.len(),
        results.curves.len()
    );
    for line in final_rows(&results.run_stats, max_iters) {
        println!("  {line}");
    }
}

/// One line per run: its parameters and the fitness at the last checkpoint.
fn final_rows(table: &Table, max_iters: usize) -> Vec<String> {
    let Some(iter_idx) = table.column_index(ITERATION) else {
        return Vec::new();
    };
    let fitness_idx = table.column_index(FITNESS);
    let param_cols: Vec<usize> = (0..table.columns.len())
        .filter(|i| ![ITERATION, FITNESS, TIME, STATE].contains(&table.columns[*i].as_str()))
        .collect();

    table
        .rows
        .iter()
        .filter(|row| {
            row[iter_idx].as_ref().and_then(Value::as_i64) == Some(max_iters as i64)
        })
        .map(|row| {
            let params: Vec<String> = param_cols
                .iter()
                .filter_map(|i| {
                    row[*i]
                        .as_ref()
                        .map(|v| format!("{}={}", table.columns[*i], v))
                })
                .collect();
            let fitness = fitness_idx
                .and_then(|i| row[i].as_ref())
                .map(Value::to_string)
                .unwrap_or_default();
            format!("{} -> fitness {}", params.join(", "), fitness)
        })
        .collect()
}
