//! Batch conversion of cached issue records into Markdown pages.
use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use migjira_config::Config;
use migjira_issue::{
  IssueRecord,
  collect_record_files,
  mapping::build_user_mapping,
  types::Project,
};
use rayon::prelude::*;

use crate::writer::{self, PROJECT_INDEX, WriterContext};

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
  /// Issue pages written.
  pub converted:  usize,
  /// Records that could not be read or written.
  pub failed:     usize,
  /// Project index pages written by this run.
  pub projects:   usize,
  pub output_dir: PathBuf,
}

fn progress_bar(len: usize) -> ProgressBar {
  let bar = ProgressBar::new(len as u64);
  if let Ok(style) = ProgressStyle::with_template(
    "{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}",
  ) {
    bar.set_style(style);
  }
  bar
}

/// Convert every record under `input` into `config.output.markdown_dir`.
///
/// Records are read and written in parallel on the global rayon pool. A
/// record that fails is logged and counted, and the batch carries on with the
/// rest. The user mapping is built across all records before any page is
/// rendered, so mentions resolve even for users that only appear on other
/// issues.
///
/// # Errors
///
/// Returns an error if `input` cannot be walked or holds no JSON records.
pub fn convert_records(input: &Path, config: &Config) -> Result<ConvertSummary> {
  let files = collect_record_files(input).wrap_err_with(|| {
    format!("Failed to collect issue records from {}", input.display())
  })?;
  if files.is_empty() {
    bail!("No JSON files found in {}", input.display());
  }
  info!("Processing {} JSON files", files.len());

  let output_dir = config.output.markdown_dir.clone();
  let mut summary = ConvertSummary {
    output_dir: output_dir.clone(),
    ..ConvertSummary::default()
  };

  let loaded: Vec<(&PathBuf, Result<IssueRecord, _>)> = files
    .par_iter()
    .map(|path| (path, IssueRecord::load(path)))
    .collect();

  let mut records = Vec::with_capacity(loaded.len());
  for (path, result) in loaded {
    match result {
      Ok(record) => records.push(record),
      Err(e) => {
        error!("Skipping {}: {e}", path.display());
        summary.failed += 1;
      },
    }
  }

  let users = build_user_mapping(records.iter().map(|record| &record.issue));
  debug!("Resolved {} users across {} records", users.len(), records.len());

  let bar = progress_bar(records.len());
  let written: Vec<(&IssueRecord, Result<PathBuf, _>)> = records
    .par_iter()
    .progress_with(bar.clone())
    .map(|record| {
      let ctx = WriterContext::new(record, config, &users);
      (record, writer::write_issue(record, &ctx, &output_dir))
    })
    .collect();
  bar.finish_and_clear();

  let mut projects: BTreeMap<&str, &Project> = BTreeMap::new();
  for (record, result) in written {
    match result {
      Ok(path) => {
        debug!("Converted {} -> {}", record.issue.key, path.display());
        summary.converted += 1;
        let project = &record.issue.fields.project;
        projects.entry(project.key.as_str()).or_insert(project);
      },
      Err(e) => {
        error!("Failed to convert {}: {e}", record.issue.key);
        summary.failed += 1;
      },
    }
  }

  for (key, project) in projects {
    let index = output_dir.join(key).join(PROJECT_INDEX);
    if index.exists() {
      debug!("Keeping existing {}", index.display());
      continue;
    }
    match writer::write_project_index(&output_dir, project) {
      Ok(_) => summary.projects += 1,
      Err(e) => warn!("Failed to write project index for {key}: {e}"),
    }
  }

  info!(
    "Converted {} issues ({} failed) into {}",
    summary.converted,
    summary.failed,
    output_dir.display()
  );

  Ok(summary)
}
