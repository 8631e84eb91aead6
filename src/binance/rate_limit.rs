// =============================================================================
// Rate limiting for Binance public market-data requests
// =============================================================================
//
// Two independent guards:
//   - `RequestThrottle` spaces consecutive requests by a minimum interval.
//   - `RateLimitTracker` reads the `X-MBX-USED-WEIGHT-1M` response header and
//     refuses new requests once the per-minute weight budget is exhausted
//     (Binance allows 1200; we hard-cap ourselves at 1000).
// =============================================================================

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Hard ceiling at which we refuse to send additional requests.
const WEIGHT_HARD_LIMIT: u32 = 1000;
/// Soft warning threshold.
const WEIGHT_WARN_THRESHOLD: u32 = 800;
/// Binance's weight counter covers a rolling one-minute window.
const WEIGHT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, Default)]
struct WeightReading {
    used_weight_1m: u32,
    reported_at: Option<Instant>,
}

/// Thread-safe weight tracker.
///
/// A reported weight is only trusted for one window after the response that
/// carried it; past that it counts as zero, so a blocked client can send
/// again without a response to lower the counter.
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    reading: Mutex<WeightReading>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the counter from the HTTP response headers returned by Binance.
    pub fn update_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        let weight = headers
            .get("X-MBX-USED-WEIGHT-1M")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok());

        if let Some(w) = weight {
            self.record_weight(w);
        }
    }

    fn record_weight(&self, w: u32) {
        let prev = {
            let mut reading = self.reading.lock();
            let prev = Self::live_weight(&reading);
            *reading = WeightReading {
                used_weight_1m: w,
                reported_at: Some(Instant::now()),
            };
            prev
        };

        if w >= WEIGHT_WARN_THRESHOLD && prev < WEIGHT_WARN_THRESHOLD {
            warn!(
                used_weight = w,
                hard_limit = WEIGHT_HARD_LIMIT,
                "rate-limit weight crossed warning threshold"
            );
        }
        debug!(used_weight_1m = w, "rate-limit weight updated from header");
    }

    fn live_weight(reading: &WeightReading) -> u32 {
        match reading.reported_at {
            Some(at) if at.elapsed() < WEIGHT_WINDOW => reading.used_weight_1m,
            _ => 0,
        }
    }

    /// Weight used in the current window, 0 once the last report is stale.
    pub fn used_weight(&self) -> u32 {
        Self::live_weight(&self.reading.lock())
    }

    /// Return `true` if we can afford to spend `weight` more request weight
    /// without exceeding the hard limit.
    pub fn can_send_request(&self, weight: u32) -> bool {
        let current = self.used_weight();
        let allowed = current + weight <= WEIGHT_HARD_LIMIT;
        if !allowed {
            warn!(
                current_weight = current,
                requested_weight = weight,
                hard_limit = WEIGHT_HARD_LIMIT,
                "request blocked, would exceed rate-limit"
            );
        }
        allowed
    }
}

// ---------------------------------------------------------------------------
// RequestThrottle
// ---------------------------------------------------------------------------

/// Enforces a minimum spacing between requests across all callers.
///
/// Each caller reserves the next free slot under the lock and then sleeps
/// outside it, so concurrent tasks queue up instead of bursting.
#[derive(Debug)]
pub struct RequestThrottle {
    min_interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl RequestThrottle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until this caller's slot comes up.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = next.map_or(now, |n| n.max(now));
            *next = Some(slot + self.min_interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}
