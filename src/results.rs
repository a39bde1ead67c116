//! Dual-stream result reconciliation.
//!
//! Both boards print one `<test> <code>` line per test case. The two streams
//! are parsed identically and merged into a single verdict per test: boards
//! that agree keep their code, boards that disagree get the conflict
//! sentinel. For most tests, error codes should never conflict.

use crate::catalog::TestCatalog;

/// Verdict recorded when the two boards disagree on a test.
pub const CONFLICT_CODE: i32 = -1;

/// Return code meaning the test passed.
pub const SUCCESS_CODE: i32 = 0;

/// Insertion-ordered mapping from test name to merged verdict.
///
/// Rows render in first-report order, so the map preserves insertion order.
/// A run covers a handful of tests; a vector scan is plenty.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResultSet {
    entries: Vec<(String, i32)>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one reported code into the set.
    ///
    /// The first report for a test records its code. A further report with
    /// the same code changes nothing; a differing report forces the conflict
    /// sentinel, which then absorbs every later report.
    pub fn record(&mut self, test: &str, code: i32) {
        match self.entries.iter_mut().find(|(name, _)| name == test) {
            None => self.entries.push((test.to_string(), code)),
            Some((_, existing)) if *existing == code => {}
            Some((_, existing)) => *existing = CONFLICT_CODE,
        }
    }

    pub fn get(&self, test: &str) -> Option<i32> {
        self.entries
            .iter()
            .find(|(name, _)| name == test)
            .map(|(_, code)| *code)
    }

    pub fn contains(&self, test: &str) -> bool {
        self.get(test).is_some()
    }

    /// Entries in first-report order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.entries.iter().map(|(name, code)| (name.as_str(), *code))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Merge one board's raw console output into the set.
///
/// A result line is exactly two whitespace-separated tokens with an integer
/// second token; anything else is console noise and skipped, as are tests
/// the catalog does not declare.
fn merge_stream(results: &mut ResultSet, output: &str, catalog: &TestCatalog) {
    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(test), Some(code), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            continue;
        };
        let Ok(code) = code.parse::<i32>() else {
            continue;
        };
        if !catalog.contains(test) {
            continue;
        }
        results.record(test, code);
    }
}

/// Reconcile the outputs of the two boards into one verdict per test.
///
/// Stream order only affects row order; the merged verdicts are the same
/// either way.
pub fn reconcile(first: &str, second: &str, catalog: &TestCatalog) -> ResultSet {
    let mut results = ResultSet::new();
    merge_stream(&mut results, first, catalog);
    merge_stream(&mut results, second, catalog);
    results
}
