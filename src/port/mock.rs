//! Mock console implementation for testing.
//!
//! Provides a `MockConsole` that simulates a board's UART without requiring
//! hardware, and a `MockOpener` that hands out pre-registered consoles by
//! device path.

use super::error::PortError;
use super::traits::{ConsoleOpener, SerialConsole};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Inner state of the mock console, protected by a mutex for interior
/// mutability.
#[derive(Debug, Default)]
struct MockConsoleState {
    /// Pending output bursts. Each burst drains fully, then the console goes
    /// quiet once before the next burst becomes readable.
    bursts: VecDeque<VecDeque<u8>>,
    /// Number of completed capture passes (quiet periods reached).
    captures: usize,
}

/// Mock console implementation for testing.
///
/// A real board emits its output in bursts separated by silence: stale boot
/// chatter before a run, then the result table after the synchronized reset.
/// Each queued burst here is drained by exactly one `read_available` call,
/// which lets tests script a discard pass followed by a capture pass.
///
/// # Example
/// ```
/// use cts_runner::port::{MockConsole, SerialConsole};
///
/// let mut console = MockConsole::new("MOCK0");
/// console.push_burst(b"stale boot text");
/// console.push_burst(b"test_a 0\n");
///
/// assert_eq!(console.read_available().unwrap(), "stale boot text");
/// assert_eq!(console.read_available().unwrap(), "test_a 0\n");
/// assert_eq!(console.read_available().unwrap(), "");
/// ```
#[derive(Clone)]
pub struct MockConsole {
    name: String,
    state: Arc<Mutex<MockConsoleState>>,
}

impl MockConsole {
    /// Create a new mock console with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockConsoleState::default())),
        }
    }

    /// Queue a burst of bytes to be drained by one capture pass.
    pub fn push_burst(&self, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.bursts.push_back(data.iter().copied().collect());
    }

    /// Number of bursts not yet fully read.
    pub fn pending_bursts(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.bursts.len()
    }

    /// Number of capture passes that have reached a quiet period.
    pub fn captures(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.captures
    }
}

impl SerialConsole for MockConsole {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock().unwrap();

        // A fully drained burst ends in exactly one quiet period.
        let drained = matches!(state.bursts.front(), Some(b) if b.is_empty());
        if drained {
            state.bursts.pop_front();
        }

        if drained || state.bursts.is_empty() {
            state.captures += 1;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "no data available",
            )));
        }

        let burst = state.bursts.front_mut().expect("burst presence checked above");
        let mut read = 0;
        for slot in buffer.iter_mut() {
            match burst.pop_front() {
                Some(b) => {
                    *slot = b;
                    read += 1;
                }
                None => break,
            }
        }
        Ok(read)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for MockConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConsole")
            .field("name", &self.name)
            .field("pending_bursts", &self.pending_bursts())
            .finish()
    }
}

/// Opener handing out pre-registered mock consoles by device path.
///
/// Cloned handles share state with the registered console, so a test can keep
/// its own handle and inspect capture counts after the run.
#[derive(Debug, Default, Clone)]
pub struct MockOpener {
    consoles: Arc<Mutex<HashMap<PathBuf, MockConsole>>>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the console to hand out for `device`.
    pub fn register(&self, device: impl Into<PathBuf>, console: MockConsole) {
        let mut consoles = self.consoles.lock().unwrap();
        consoles.insert(device.into(), console);
    }
}

impl ConsoleOpener for MockOpener {
    fn open(
        &self,
        device: &Path,
        _baud: u32,
        _timeout: Duration,
    ) -> Result<Box<dyn SerialConsole>, PortError> {
        let consoles = self.consoles.lock().unwrap();
        consoles
            .get(device)
            .cloned()
            .map(|c| Box::new(c) as Box<dyn SerialConsole>)
            .ok_or_else(|| PortError::not_found(device.to_string_lossy()))
    }
}
