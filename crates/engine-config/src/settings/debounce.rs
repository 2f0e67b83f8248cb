use super::error::SettingsError;
use std::time::Duration;

/// Floor for the derived max wait when none is configured.
const MIN_DEFAULT_MAX_WAIT: Duration = Duration::from_millis(100);

/// Quiet period and latency cap for a rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceSettings {
    wait: Duration,
    max_wait: Duration,
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(100),
            max_wait: Duration::from_millis(1000),
        }
    }
}

impl DebounceSettings {
    /// Builds debounce settings. Without an explicit `max_wait` the cap is
    /// `max(wait * 10, 100ms)`.
    pub fn new(wait: Duration, max_wait: Option<Duration>) -> Result<Self, SettingsError> {
        let max_wait = max_wait.unwrap_or_else(|| (wait * 10).max(MIN_DEFAULT_MAX_WAIT));
        if max_wait < wait {
            return Err(SettingsError::MaxWaitBelowWait {
                wait_ms: wait.as_millis() as u64,
                max_wait_ms: max_wait.as_millis() as u64,
            });
        }
        Ok(Self { wait, max_wait })
    }

    pub fn from_millis(wait_ms: u64, max_wait_ms: Option<u64>) -> Result<Self, SettingsError> {
        Self::new(
            Duration::from_millis(wait_ms),
            max_wait_ms.map(Duration::from_millis),
        )
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_max_wait_from_wait() {
        let s = DebounceSettings::from_millis(50, None).unwrap();
        assert_eq!(s.max_wait(), Duration::from_millis(500));

        let zero = DebounceSettings::from_millis(0, None).unwrap();
        assert_eq!(zero.max_wait(), Duration::from_millis(100));

        let small = DebounceSettings::from_millis(5, None).unwrap();
        assert_eq!(small.max_wait(), Duration::from_millis(100));
    }

    #[test]
    fn rejects_max_wait_below_wait() {
        let err = DebounceSettings::from_millis(200, Some(100)).unwrap_err();
        assert_eq!(
            err,
            SettingsError::MaxWaitBelowWait {
                wait_ms: 200,
                max_wait_ms: 100
            }
        );
    }
}
