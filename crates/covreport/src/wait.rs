//! Waiting for the execution data to be complete.
//!
//! Two waits run before anything is read:
//!
//! - **Availability**: poll until the execution data file exists, bounded by
//!   a timeout. Timing out is not fatal; the loader reports the real cause.
//! - **Quiescence**: poll a [`FlushSignal`] published by the instrumentation
//!   agent until it reports that all data has been flushed, bounded by its
//!   own timeout.
//!
//! Both waits consult a [`CancellationToken`] between polls.

use crate::result::{ReportError, ReportResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default budget for the execution data file to appear (10 seconds)
pub const DEFAULT_ARTIFACT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Default budget for the agent's flush-complete signal (60 seconds)
pub const DEFAULT_QUIESCENCE_TIMEOUT_MS: u64 = 60_000;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::artifact()
    }
}

impl WaitOptions {
    /// Options for the execution data availability wait
    #[must_use]
    pub const fn artifact() -> Self {
        Self {
            timeout_ms: DEFAULT_ARTIFACT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Options for the agent quiescence wait
    #[must_use]
    pub const fn quiescence() -> Self {
        Self {
            timeout_ms: DEFAULT_QUIESCENCE_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a wait operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Whether the awaited condition was observed
    pub success: bool,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

impl WaitResult {
    /// Create a satisfied wait result
    #[must_use]
    pub fn success(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: true,
            elapsed,
            waited_for: waited_for.into(),
        }
    }

    /// Create a timed-out wait result
    #[must_use]
    pub fn timeout(elapsed: Duration, waited_for: impl Into<String>) -> Self {
        Self {
            success: false,
            elapsed,
            waited_for: waited_for.into(),
        }
    }

    /// Elapsed time in whole milliseconds
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Shared flag that aborts a running wait
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// =============================================================================
// FLUSH SIGNALS
// =============================================================================

/// Completion marker published by the instrumentation agent
pub trait FlushSignal: fmt::Debug + Send + Sync {
    /// Whether the agent has finished writing execution data
    fn is_flushed(&self) -> bool;

    /// Human-readable description used in logs and errors
    fn describe(&self) -> String;
}

/// Flush signal backed by a marker file the agent writes when done
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentinelFile {
    path: PathBuf,
}

impl SentinelFile {
    /// Watch for the given marker file
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Marker file location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FlushSignal for SentinelFile {
    fn is_flushed(&self) -> bool {
        self.path.exists()
    }

    fn describe(&self) -> String {
        format!("sentinel file {}", self.path.display())
    }
}

/// In-process flush signal the agent raises when done
#[derive(Debug, Clone, Default)]
pub struct FlushFlag {
    raised: Arc<AtomicBool>,
}

impl FlushFlag {
    /// Create a lowered flag
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag; every clone observes it
    pub fn raise(&self) {
        self.raised.store(true, Ordering::SeqCst);
    }
}

impl FlushSignal for FlushFlag {
    fn is_flushed(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }

    fn describe(&self) -> String {
        "in-process flush flag".to_string()
    }
}

// =============================================================================
// WAITS
// =============================================================================

/// Poll `predicate` until it holds, the timeout elapses, or cancellation
///
/// The predicate is checked at least once, so a zero timeout still observes
/// a condition that already holds.
pub fn poll_until<F>(
    predicate: F,
    options: &WaitOptions,
    cancel: &CancellationToken,
    waited_for: &str,
) -> ReportResult<WaitResult>
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval();

    loop {
        if predicate() {
            return Ok(WaitResult::success(start.elapsed(), waited_for));
        }
        if cancel.is_cancelled() {
            return Err(ReportError::Cancelled);
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Ok(WaitResult::timeout(elapsed, waited_for));
        }
        trace!(waited_for, elapsed_ms = elapsed.as_millis() as u64, "polling");
        std::thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

/// Wait for a file to exist
pub fn wait_for_file(
    path: &Path,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> ReportResult<WaitResult> {
    let description = format!("file {}", path.display());
    let result = poll_until(|| path.exists(), options, cancel, &description)?;
    debug!(
        path = %path.display(),
        success = result.success,
        elapsed_ms = result.elapsed_ms(),
        "artifact wait finished"
    );
    Ok(result)
}

/// Wait for the agent's flush-complete signal
///
/// Without a configured signal there is nothing to observe and the wait
/// returns immediately.
pub fn wait_for_quiescence(
    signal: Option<&dyn FlushSignal>,
    options: &WaitOptions,
    cancel: &CancellationToken,
) -> ReportResult<WaitResult> {
    let Some(signal) = signal else {
        return Ok(WaitResult::success(Duration::ZERO, "no flush signal"));
    };
    let description = signal.describe();
    let result = poll_until(|| signal.is_flushed(), options, cancel, &description)?;
    debug!(
        signal = %description,
        success = result.success,
        elapsed_ms = result.elapsed_ms(),
        "quiescence wait finished"
    );
    Ok(result)
}
