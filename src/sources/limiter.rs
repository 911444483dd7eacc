use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct RateState {
    last_call_at: Option<Instant>,
}

/// Per-identity minimum-interval rate limiter.
///
/// `acquire` suspends the caller until at least `min_interval` has elapsed
/// since the identity's last granted call, then records the grant. Each
/// identity has its own async mutex, so callers of unrelated identities
/// never contend; the outer map lock is held only long enough to look up
/// or create that per-identity lock. Tokio mutexes queue waiters fairly,
/// so a simultaneous burst of N callers drains in arrival order, one per
/// interval.
///
/// The interval is supplied by the caller, which keeps per-identity
/// policy in configuration rather than baked into the limiter.
pub struct RateLimiter {
    states: StdMutex<HashMap<String, Arc<Mutex<RateState>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            states: StdMutex::new(HashMap::new()),
        }
    }

    /// Block (asynchronously) until this identity may make its next call
    pub async fn acquire(&self, identity: &str, min_interval: Duration) {
        let state = {
            let mut states = self.states.lock().unwrap();
            states
                .entry(identity.to_string())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(RateState { last_call_at: None }))
                })
                .clone()
        };

        let mut state = state.lock().await;
        if let Some(last) = state.last_call_at {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                let wait = min_interval - elapsed;
                log::debug!("Rate limit: {} waits {:?}", identity, wait);
                tokio::time::sleep(wait).await;
            }
        }
        state.last_call_at = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
