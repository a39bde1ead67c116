//! Test catalog and return code listings.
//!
//! Test modules declare their cases in `cts/<module>/cts.testlist` through
//! `CTS_TEST(...)` macro lines, and the shared return codes live in
//! `cts/common/cts.rc` as `CTS_RC_` enum entries. Both files are C headers
//! consumed by the firmware build; the runner scrapes the macro arguments
//! out of them once per run.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Macro prefix of a test declaration in a testlist file.
const TEST_MACRO: &str = "CTS_TEST";

/// Macro prefix of a return code entry in the shared rc file.
const RC_MACRO: &str = "CTS_RC_";

/// Failure to read a listing file.
#[derive(Debug, Error)]
#[error("failed to read listing '{path}': {source}")]
pub struct CatalogError {
    path: PathBuf,
    #[source]
    source: std::io::Error,
}

/// Collect the arguments of every standalone use of `macro_prefix`.
///
/// Matches lines whose trimmed text starts with the prefix, then strips the
/// prefix, any surrounding parentheses and all commas. `CTS_TEST(test_x)`
/// yields `test_x`; the rc entry `CTS_RC_FAILURE,` yields `FAILURE`.
fn macro_args(content: &str, macro_prefix: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with(macro_prefix))
        .map(|line| {
            line[macro_prefix.len()..]
                .trim_matches(['(', ')'])
                .replace(',', "")
        })
        .collect()
}

fn read_listing(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError {
        path: path.to_path_buf(),
        source,
    })
}

/// Ordered list of test names declared by a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCatalog {
    names: Vec<String>,
}

impl TestCatalog {
    /// Load the catalog from a `cts.testlist` file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self::from_names(macro_args(&read_listing(path)?, TEST_MACRO)))
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Test names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, test: &str) -> bool {
        self.names.iter().any(|n| n == test)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Return code names, indexed by their integer value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnCodes {
    names: Vec<String>,
}

impl ReturnCodes {
    /// Load the code names from the shared `cts.rc` file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        Ok(Self::from_names(macro_args(&read_listing(path)?, RC_MACRO)))
    }

    pub fn from_names(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Name of a return code, or `None` when the firmware reported a value
    /// outside the listing.
    pub fn name_for(&self, code: i32) -> Option<&str> {
        let index = usize::try_from(code).ok()?;
        self.names.get(index).map(String::as_str)
    }
}
