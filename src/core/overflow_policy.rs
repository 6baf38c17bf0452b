//! Overflow policies for the bounded per-sink delivery queues
//!
//! Log calls must complete in bounded, small time regardless of sink health.
//! When a sink's queue is full these policies decide what happens to the line
//! headed for that sink. Other sinks are unaffected either way.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Grace period the default policy waits for a slow sink before dropping.
pub const DEFAULT_ENQUEUE_GRACE: Duration = Duration::from_millis(50);

/// Policy for a full per-sink delivery queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Block until the sink drains. Unbounded producer latency; only for
    /// callers that must never lose a line.
    Block,

    /// Block for at most the given grace period, then drop the line and
    /// alert. Bounded producer latency with a chance for the sink to catch
    /// up. This is the default, with [`DEFAULT_ENQUEUE_GRACE`].
    BlockWithTimeout(Duration),

    /// Drop the line immediately. Metrics still count the drop.
    DropNewest,

    /// Drop the line immediately and alert via the overflow callback and
    /// stderr.
    AlertAndDrop,
}

impl Default for OverflowPolicy {
    fn default() -> Self {
        OverflowPolicy::BlockWithTimeout(DEFAULT_ENQUEUE_GRACE)
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::BlockWithTimeout(d) => write!(f, "BlockWithTimeout({:?})", d),
            OverflowPolicy::DropNewest => write!(f, "DropNewest"),
            OverflowPolicy::AlertAndDrop => write!(f, "AlertAndDrop"),
        }
    }
}

/// Callback for overflow notifications. The parameter is the running count of
/// dropped lines.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        assert_eq!(
            OverflowPolicy::default(),
            OverflowPolicy::BlockWithTimeout(DEFAULT_ENQUEUE_GRACE)
        );
    }

    #[test]
    fn test_policy_display() {
        assert_eq!(OverflowPolicy::Block.to_string(), "Block");
        assert_eq!(OverflowPolicy::DropNewest.to_string(), "DropNewest");
        assert_eq!(
            OverflowPolicy::BlockWithTimeout(Duration::from_millis(100)).to_string(),
            "BlockWithTimeout(100ms)"
        );
    }
}
