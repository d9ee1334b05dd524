//! Uniform response latency for the auth gate. Every post-validation
//! register/login outcome, success included, is padded to the same floor so
//! a black-box observer cannot tell the branches apart by wall clock.

use std::time::{Duration, Instant};

pub struct ResponseTimer {
    started: Instant,
    floor: Duration,
}

impl ResponseTimer {
    pub fn start(floor: Duration) -> Self {
        Self {
            started: Instant::now(),
            floor,
        }
    }

    /// Suspend until the floor has elapsed since `start`. Purely a task
    /// suspension: no lock or pool connection may be held across this await.
    pub async fn pad(&self) {
        let elapsed = self.started.elapsed();
        if elapsed < self.floor {
            tokio::time::sleep(self.floor - elapsed).await;
        }
    }
}
