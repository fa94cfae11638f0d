//! Tracing helpers for tests that assert on what was logged.
//!
//! Tests that only want log output shown use `#[test_log::test]`.

use keychord_core::{LogCollector, LogReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run `f` with a thread-local subscriber that records every event, and
/// return what it recorded alongside `f`'s result.
///
/// ```ignore
/// let (_, logs) = capture_logs(|| keyboard.type_keys("gg"));
/// assert!(logs.entries().iter().any(|e| e.field("command") == Some("scroll-to-top")));
/// ```
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, LogReader) {
    let collector = LogCollector::new(1024);
    let reader = collector.reader();
    let _guard = tracing_subscriber::registry().with(collector).set_default();
    (f(), reader)
}
