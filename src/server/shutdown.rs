// Shutdown drain module
// Waits for in-flight connections to finish once the listener is closed

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// How often the active connection count is re-checked while draining
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until `active` reaches zero or `timeout` elapses.
///
/// Returns the number of connections still open when the wait ended.
pub async fn drain_connections(active: &AtomicUsize, timeout: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut ticker = tokio::time::interval(DRAIN_POLL_INTERVAL);

    loop {
        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 {
            return 0;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            () = tokio::time::sleep_until(deadline) => {
                return active.load(Ordering::SeqCst);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_returns_immediately_when_idle() {
        let active = AtomicUsize::new(0);
        assert_eq!(drain_connections(&active, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_waits_for_connections_to_close() {
        let active = Arc::new(AtomicUsize::new(2));
        let closer = Arc::clone(&active);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            closer.fetch_sub(2, Ordering::SeqCst);
        });

        assert_eq!(drain_connections(&active, Duration::from_secs(5)).await, 0);
    }

    #[tokio::test]
    async fn test_gives_up_at_deadline() {
        let active = AtomicUsize::new(3);
        let remaining = drain_connections(&active, Duration::from_millis(100)).await;
        assert_eq!(remaining, 3);
    }
}
