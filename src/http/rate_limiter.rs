use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

/// Sliding-window limiter: at most `calls` acquisitions per `period`.
#[derive(Clone)]
pub struct RateLimiter {
    name: &'static str,
    state: Arc<Mutex<WindowState>>,
}

struct WindowState {
    calls: usize,
    period: Duration,
    call_times: VecDeque<Instant>,
}

impl WindowState {
    /// How long the next caller must wait, after dropping calls outside the window.
    fn delay_at(&mut self, now: Instant) -> Option<Duration> {
        while let Some(&oldest) = self.call_times.front() {
            if now.duration_since(oldest) >= self.period {
                self.call_times.pop_front();
            } else {
                break;
            }
        }

        if self.call_times.len() < self.calls {
            return None;
        }

        self.call_times
            .front()
            .map(|&oldest| self.period.saturating_sub(now.duration_since(oldest)))
            .filter(|d| !d.is_zero())
    }
}

impl RateLimiter {
    pub fn new(name: &'static str, calls: usize, period: Duration) -> Self {
        Self {
            name,
            state: Arc::new(Mutex::new(WindowState {
                calls: calls.max(1),
                period,
                call_times: VecDeque::new(),
            })),
        }
    }

    /// Text-extraction service: 50 calls per 10 seconds.
    pub fn llm() -> Self {
        Self::new("OpenRouter", 50, Duration::from_secs(10))
    }

    pub fn senate_web() -> Self {
        Self::new("Senate Web", 1, Duration::from_secs(1))
    }

    pub fn house_web() -> Self {
        Self::new("House Web", 10, Duration::from_secs(1))
    }

    pub async fn wait(&self) {
        let mut state = self.state.lock().await;

        // Another waiter may take the freed slot while this one sleeps.
        while let Some(delay) = state.delay_at(Instant::now()) {
            drop(state);
            tracing::debug!("Rate limiter '{}': waiting {:?}", self.name, delay);
            sleep(delay).await;
            state = self.state.lock().await;
        }

        state.call_times.push_back(Instant::now());
    }
}
