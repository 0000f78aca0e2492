//! Inter-request pacing.
//!
//! Every unit of work (successful or not) is followed by a pause. The pause
//! starts at the source's configured delay, doubles when the upstream answers
//! 429/503, and gradually recovers after consecutive successes.

use std::time::Duration;

use tracing::{debug, info, warn};

/// Configuration for pacing behavior.
#[derive(Debug, Clone)]
pub struct PacerConfig {
    /// Delay between units of work when not backing off.
    pub base_delay: Duration,
    /// Floor applied when backing off from a zero or tiny base delay.
    pub min_backoff: Duration,
    /// Maximum delay (ceiling for backoff).
    pub max_delay: Duration,
    /// Multiplier for exponential backoff on rate limit.
    pub backoff_multiplier: f64,
    /// Multiplier for recovery on success (< 1.0 to decrease delay).
    pub recovery_multiplier: f64,
    /// Number of consecutive successes before reducing delay.
    pub recovery_threshold: u32,
}

impl Default for PacerConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(3),
            min_backoff: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            recovery_multiplier: 0.8,
            recovery_threshold: 5,
        }
    }
}

/// Adaptive pause between fetches of one source run.
#[derive(Debug, Clone)]
pub struct Pacer {
    config: PacerConfig,
    current_delay: Duration,
    consecutive_successes: u32,
    in_backoff: bool,
}

impl Pacer {
    /// Create a pacer with the default backoff settings and the given base delay.
    pub fn new(base_delay: Duration) -> Self {
        Self::with_config(PacerConfig {
            base_delay,
            ..Default::default()
        })
    }

    pub fn with_config(config: PacerConfig) -> Self {
        Self {
            current_delay: config.base_delay,
            config,
            consecutive_successes: 0,
            in_backoff: false,
        }
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn in_backoff(&self) -> bool {
        self.in_backoff
    }

    /// Report a successful unit of work - may decrease delay.
    pub fn report_success(&mut self) {
        self.consecutive_successes += 1;

        if self.in_backoff && self.consecutive_successes >= self.config.recovery_threshold {
            let reduced = Duration::from_secs_f64(
                self.current_delay.as_secs_f64() * self.config.recovery_multiplier,
            );

            if reduced <= self.config.base_delay {
                self.current_delay = self.config.base_delay;
                self.in_backoff = false;
                info!("Recovered from rate limit backoff");
            } else {
                self.current_delay = reduced;
                debug!("Pacing delay reduced to {:?}", self.current_delay);
            }
            self.consecutive_successes = 0;
        }
    }

    /// Report a definite rate limit hit (429 or 503) - increases delay.
    pub fn report_rate_limit(&mut self, status_code: u16) {
        self.consecutive_successes = 0;
        self.in_backoff = true;

        let increased = Duration::from_secs_f64(
            self.current_delay.as_secs_f64() * self.config.backoff_multiplier,
        );
        self.current_delay = increased
            .max(self.config.min_backoff)
            .min(self.config.max_delay);

        warn!(
            "Rate limited (HTTP {}), backing off to {:?}",
            status_code, self.current_delay
        );
    }

    /// Report a failure that is not a rate limit - delay unchanged.
    pub fn report_failure(&mut self) {
        self.consecutive_successes = 0;
    }

    /// Sleep for the current delay.
    pub async fn pause(&self) {
        if self.current_delay > Duration::ZERO {
            debug!("Pausing {:?} before next request", self.current_delay);
            tokio::time::sleep(self.current_delay).await;
        }
    }
}
