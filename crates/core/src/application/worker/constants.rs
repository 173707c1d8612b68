// Worker constants (No magic values)
use std::time::Duration;

/// Width of the per-call generation pool
pub const GENERATOR_WIDTH: usize = 8;

/// Bound on each generation sub-task (5s)
pub const SUBTASK_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound of the random pause before each unit of work (100ms)
pub const MAX_WORKER_PAUSE: Duration = Duration::from_millis(100);

/// Queue size sampling period (100ms)
pub const MONITOR_INTERVAL: Duration = Duration::from_millis(100);

/// Time workers get to stop after shutdown before they are aborted (5s)
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);
