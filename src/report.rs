//! Result table rendering and persistence.

use crate::catalog::{ReturnCodes, TestCatalog};
use crate::results::{ResultSet, CONFLICT_CODE};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Verdict string for a test both boards reported with differing codes.
const CONFLICT_TEXT: &str = "RESULTS CONFLICT";

/// Verdict string for a declared test neither board reported.
const MISSING_TEXT: &str = "NO RESULT RETURNED";

/// Failure to persist a rendered report.
#[derive(Debug, Error)]
#[error("failed to write results to '{path}': {source}")]
pub struct ReportError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

/// Render the merged results as an aligned two-column table.
///
/// Rows appear in first-report order, followed by declared tests that never
/// reported. Codes outside the return code listing render as their bare
/// integer value.
pub fn render(
    module: &str,
    results: &ResultSet,
    catalog: &TestCatalog,
    codes: &ReturnCodes,
) -> String {
    let mut rows: Vec<(String, String)> = results
        .iter()
        .map(|(test, code)| (test.to_string(), verdict_text(code, codes)))
        .collect();
    for test in catalog.names() {
        if !results.contains(test) {
            rows.push((test.clone(), MISSING_TEXT.to_string()));
        }
    }

    let name_width = rows.iter().map(|(test, _)| test.len()).max().unwrap_or(0);
    let verdict_width = rows.iter().map(|(_, v)| v.len()).max().unwrap_or(0);

    let mut table = format!("CTS Test Results for {module} module:");
    for (test, verdict) in &rows {
        table.push_str(&format!(
            "\n{test:<name_width$} {verdict:>verdict_width$}"
        ));
    }
    table
}

fn verdict_text(code: i32, codes: &ReturnCodes) -> String {
    if code == CONFLICT_CODE {
        return CONFLICT_TEXT.to_string();
    }
    match codes.name_for(code) {
        Some(name) => name.to_string(),
        None => code.to_string(),
    }
}

/// Write the rendered table to its results file, replacing any previous run.
pub fn persist(path: &Path, table: &str) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ReportError {
            path: path.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, table).map_err(|source| ReportError {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "results saved");
    Ok(())
}
