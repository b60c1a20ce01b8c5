//! Integration tests for the cache statistics poller
//!
//! Time is paused so the cadence can be checked without real waiting.

#[cfg(test)]
mod tests {
    use super::super::monitoring::*;
    use super::super::test_support::MockBackend;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::sleep;

    fn setup() -> (Arc<MockBackend>, StatsPoller) {
        let backend = Arc::new(MockBackend::new());
        let poller = StatsPoller::new(
            backend.clone(),
            Arc::new(StatsBoard::new()),
            DEFAULT_STATS_INTERVAL,
        );
        (backend, poller)
    }

    fn calls(backend: &MockBackend) -> usize {
        *backend.stats_calls.lock()
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let (backend, poller) = setup();
        for total in [10, 20, 30] {
            backend.push_stats_json(json!({
                "cache": {"hit_rate": 50.0, "total_requests": total},
                "total_cached_videos": 4
            }));
        }

        poller.start();
        assert!(poller.is_running());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(calls(&backend), 1);
        assert_eq!(poller.board().display().total_requests, "10");

        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls(&backend), 2);
        assert_eq!(poller.board().display().total_requests, "20");

        sleep(Duration::from_secs(10)).await;
        assert_eq!(calls(&backend), 3);

        let display = poller.board().display();
        assert_eq!(display.hit_rate, "50%");
        assert_eq!(display.total_requests, "30");
        assert_eq!(display.cached_videos, "4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_stats_render_as_zero() {
        let (backend, poller) = setup();
        backend.push_stats_json(json!({}));

        let display = poller.poll_once().await.unwrap();

        assert_eq!(display.hit_rate, "0%");
        assert_eq!(display.total_requests, "0");
        assert_eq!(display.cached_videos, "0");
        assert_eq!(poller.board().display(), display);
        assert!(poller.board().snapshot().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_keep_last_values_and_cadence() {
        let (backend, poller) = setup();
        backend.push_stats_json(json!({
            "cache": {"hit_rate": 66.67, "total_requests": 3},
            "total_cached_videos": 12
        }));
        backend.fail_stats("connection refused");
        backend.push_stats_json(json!("garbage"));

        poller.start();
        sleep(Duration::from_secs(25)).await;

        assert_eq!(calls(&backend), 3);
        assert_eq!(poller.board().failures(), 2);
        let display = poller.board().display();
        assert_eq!(display.hit_rate, "66.67%");
        assert_eq!(display.total_requests, "3");
        assert_eq!(display.cached_videos, "12");

        // exhausted script keeps failing, polling carries on
        sleep(Duration::from_secs(20)).await;
        assert_eq!(calls(&backend), 5);
        assert!(poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_polling() {
        let (backend, poller) = setup();

        poller.start();
        sleep(Duration::from_secs(15)).await;
        assert_eq!(calls(&backend), 2);

        poller.stop();
        assert!(!poller.is_running());
        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls(&backend), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_does_not_duplicate_task() {
        let (backend, poller) = setup();

        poller.start();
        poller.start();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(calls(&backend), 1);

        poller.stop();
        poller.start();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(calls(&backend), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_poller_stops_task() {
        let (backend, poller) = setup();
        poller.start();
        sleep(Duration::from_secs(1)).await;
        drop(poller);

        sleep(Duration::from_secs(60)).await;
        assert_eq!(calls(&backend), 1);
    }
}
