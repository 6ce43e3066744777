//! Durable table output with deterministic file names.
//!
//! Every table is written twice, as `{root}.csv` and `{root}.bin`, where
//! `root` is `{output_dir}/{runner}_{experiment}_{table}`. Identical names
//! overwrite the previous artifacts.

use crate::error::SweepError;
use crate::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Binary snapshot of a table plus its naming key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub runner_name: String,
    pub experiment_name: String,
    pub table_name: String,
    pub created_at: DateTime<Utc>,
    pub table: Table,
}

/// Path stem shared by the CSV and binary artifacts of one table.
pub fn build_data_filename(
    output_dir: &Path,
    runner_name: &str,
    experiment_name: &str,
    table_name: &str,
) -> PathBuf {
    output_dir.join(format!("{runner_name}_{experiment_name}_{table_name}"))
}

/// Create the output directory if needed. Succeeds when it already exists.
pub fn ensure_output_dir(path: &Path) -> Result<(), SweepError> {
    if path.exists() && !path.is_dir() {
        return Err(SweepError::config(format!(
            "output path {} exists and is not a directory",
            path.display()
        )));
    }
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Append `.{ext}` without touching dots already in the stem.
fn with_suffix(root: &Path, ext: &str) -> PathBuf {
    let mut name = root.as_os_str().to_owned();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

/// Write raw bytes via a `.tmp` sibling renamed into place.
fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = with_suffix(path, "tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Writes named tables under one output directory.
#[derive(Debug, Clone)]
pub struct TableWriter {
    output_dir: PathBuf,
    runner_name: String,
    experiment_name: String,
}

impl TableWriter {
    pub fn new(output_dir: &Path, runner_name: &str, experiment_name: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            runner_name: runner_name.to_string(),
            experiment_name: experiment_name.to_string(),
        }
    }

    pub fn filename_root(&self, table_name: &str) -> PathBuf {
        build_data_filename(
            &self.output_dir,
            &self.runner_name,
            &self.experiment_name,
            table_name,
        )
    }

    /// Write `table` as CSV and binary snapshot. Returns the two paths.
    pub fn write(&self, table_name: &str, table: &Table) -> Result<[PathBuf; 2], SweepError> {
        let root = self.filename_root(table_name);
        let bin_path = with_suffix(&root, "bin");
        let csv_path = with_suffix(&root, "csv");

        let snapshot = TableSnapshot {
            runner_name: self.runner_name.clone(),
            experiment_name: self.experiment_name.clone(),
            table_name: table_name.to_string(),
            created_at: Utc::now(),
            table: table.clone(),
        };
        atomic_write(&bin_path, &bincode::serialize(&snapshot)?)?;
        tracing::info!(path = %bin_path.display(), "Saving");

        atomic_write(&csv_path, table.to_csv().as_bytes())?;
        tracing::info!(path = %csv_path.display(), "Saving");

        Ok([csv_path, bin_path])
    }
}

/// Load a binary snapshot written by [`TableWriter::write`].
pub fn load_snapshot(path: &Path) -> Result<TableSnapshot, SweepError> {
    let bytes = std::fs::read(path)?;
    Ok(bincode::deserialize(&bytes)?)
}
