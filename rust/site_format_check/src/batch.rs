use crate::archive::inspect_archive;
use crate::error::CheckError;
use crate::report::Report;
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub submissions_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub assignment: String,
    /// Applied to each archive's file name; the first capture group (or the
    /// whole match) becomes the student id.
    pub id_pattern: Option<Regex>,
}

impl BatchConfig {
    pub fn new(submissions_dir: impl Into<PathBuf>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            submissions_dir: submissions_dir.into(),
            reports_dir: reports_dir.into(),
            assignment: crate::DEFAULT_ASSIGNMENT.to_string(),
            id_pattern: None,
        }
    }

    pub fn with_id_pattern(mut self, pattern: &str) -> Result<Self, CheckError> {
        self.id_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub passed: usize,
}

pub fn student_id_from(filename: &str, pattern: Option<&Regex>) -> Option<String> {
    let caps = pattern?.captures(filename)?;
    caps.get(1)
        .or_else(|| caps.get(0))
        .map(|m| m.as_str().to_string())
}

/// Inspect one archive and build its report. Never fails.
pub fn check_submission(path: &Path, assignment: &str, student_id: Option<String>) -> Report {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Report::assemble(student_id, filename, assignment, inspect_archive(path))
}

fn is_zip(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case("zip"))
            .unwrap_or(false)
}

fn report_path(reports_dir: &Path, zip_path: &Path) -> PathBuf {
    let stem = zip_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    reports_dir.join(format!("{stem}.json"))
}

/// Check every `.zip` in the submissions directory, in file-name order, and
/// write one `<stem>.json` report per archive.
///
/// Only an unusable submissions directory is an error. A report that cannot
/// be written is logged and recorded in the summary; the batch carries on.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary, CheckError> {
    let dir = &config.submissions_dir;
    if !dir.is_dir() {
        return Err(CheckError::SubmissionsDirMissing(dir.clone()));
    }

    if let Err(e) = std::fs::create_dir_all(&config.reports_dir) {
        tracing::warn!(
            path = %config.reports_dir.display(),
            error = %e,
            "could not create reports directory"
        );
    }

    let read_dir = |source| CheckError::ReadDir {
        path: dir.clone(),
        source,
    };
    let mut entries = std::fs::read_dir(dir)
        .map_err(read_dir)?
        .map(|e| e.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_dir)?;
    entries.sort();

    let mut summary = BatchSummary::default();
    for zip_path in entries.into_iter().filter(|p| is_zip(p)) {
        let filename = zip_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let student_id = student_id_from(&filename, config.id_pattern.as_ref());
        let report = check_submission(&zip_path, &config.assignment, student_id);
        let out = report_path(&config.reports_dir, &zip_path);

        let written = report
            .to_json()
            .map_err(std::io::Error::from)
            .and_then(|json| std::fs::write(&out, json));
        match written {
            Ok(()) => {
                tracing::info!(
                    file = %filename,
                    issues = report.format_issues().len(),
                    ok = report.format_ok(),
                    "report written"
                );
                if report.format_ok() {
                    summary.passed += 1;
                }
                summary.written.push(out);
            }
            Err(e) => {
                tracing::error!(path = %out.display(), error = %e, "could not write report");
                summary.failed.push(out);
            }
        }
    }

    Ok(summary)
}
