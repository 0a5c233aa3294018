//! Enrichers that augment generated recipes with images.
//!
//! Both enrichers fan out one image request per item and wait for every
//! request to settle before returning. They differ in failure policy:
//! - `enrich_cover_images` is all-or-nothing
//! - `enrich_detail` keeps going and leaves a gap where a step image failed

mod cover;
mod detail;

pub use cover::enrich_cover_images;
pub use detail::{enrich_detail, EnrichedDetail};

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run `call` over every item with at most `width` calls in flight.
///
/// Waits for all calls to settle (no short-circuit on failure). Results are
/// returned in input order regardless of completion order.
async fn fan_out<I, F, Fut, T>(items: I, width: usize, call: F) -> Vec<T>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(items)
        .map(call)
        .buffered(width.max(1))
        .collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_preserves_input_order() {
        // Later items finish first.
        let results = fan_out(vec![3u64, 2, 1], 3, |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay * 10)).await;
            delay
        })
        .await;

        assert_eq!(results, vec![3, 2, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fan_out_respects_width() {
        let counters = (AtomicUsize::new(0), AtomicUsize::new(0));
        let (in_flight, peak) = (&counters.0, &counters.1);

        fan_out(0..10, 3, move |_| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
        })
        .await;

        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_fan_out_waits_for_all_results() {
        let results: Vec<Result<u32, &str>> = fan_out(0..4u32, 4, |n| async move {
            if n == 1 {
                Err("failed")
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(results, vec![Ok(0), Err("failed"), Ok(2), Ok(3)]);
    }
}
