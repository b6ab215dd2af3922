use serde::Deserialize;
use std::time::Duration;

#[cfg(test)]
mod tests;

/// Reconnection policy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt (milliseconds); doubles
    /// on each subsequent attempt
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Attempts allowed before giving up until the next explicit connect
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_attempts() -> u32 {
    5
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: default_base_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Outcome of requesting the next reconnection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Attempt `attempt` (1-based) after waiting `delay`
    Schedule { attempt: u32, delay: Duration },
    /// The attempt budget is spent; wait for an explicit connect
    Exhausted,
}

/// Exponential backoff state for one client.
///
/// The counter only resets on a successful connection, so a manual connect
/// after exhaustion that fails again reports exhaustion immediately.
#[derive(Debug)]
pub struct ReconnectState {
    config: ReconnectConfig,
    attempts: u32,
}

impl ReconnectState {
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Consume one attempt and compute its delay: `base * 2^(attempt-1)`
    pub fn next_attempt(&mut self) -> Backoff {
        if self.attempts >= self.config.max_attempts {
            return Backoff::Exhausted;
        }
        self.attempts += 1;
        let factor = 2u64.saturating_pow(self.attempts - 1);
        let delay_ms = self.config.base_delay_ms.saturating_mul(factor);
        Backoff::Schedule {
            attempt: self.attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Reset the counter after a successful connection
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
