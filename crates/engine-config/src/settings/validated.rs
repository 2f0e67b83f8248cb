use crate::settings::{debounce::DebounceSettings, error::SettingsError};

pub const DEFAULT_WINDOW_CAP: usize = 50;
pub const DEFAULT_MAX_GROWTH_STEPS: usize = 10_000;
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Immutable, validated configuration of an offset cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorSettings {
    /// Rows watched behind the cursor, at most (in addition to one page).
    pub window_cap: usize,
    /// Consecutive growth queries allowed before growth is abandoned
    pub max_growth_steps: usize,
    /// Capacity of the cursor actor mailbox
    pub mailbox_capacity: usize,
    /// Coalescing of recache requests
    pub recache: DebounceSettings,
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            window_cap: DEFAULT_WINDOW_CAP,
            max_growth_steps: DEFAULT_MAX_GROWTH_STEPS,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            recache: DebounceSettings::default(),
        }
    }
}

impl CursorSettings {
    pub fn builder() -> CursorSettingsBuilder {
        CursorSettingsBuilder::default()
    }

    pub fn window_cap(&self) -> usize {
        self.window_cap
    }

    pub fn max_growth_steps(&self) -> usize {
        self.max_growth_steps
    }

    pub fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity
    }

    pub fn recache(&self) -> DebounceSettings {
        self.recache
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_growth_steps == 0 {
            return Err(SettingsError::OutOfRange {
                key: "max_growth_steps",
                reason: "must be at least 1".into(),
            });
        }
        if self.mailbox_capacity == 0 {
            return Err(SettingsError::OutOfRange {
                key: "mailbox_capacity",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CursorSettingsBuilder {
    pub window_cap: Option<usize>,
    pub max_growth_steps: Option<usize>,
    pub mailbox_capacity: Option<usize>,
    pub recache: Option<DebounceSettings>,
}

impl CursorSettingsBuilder {
    pub fn window_cap(mut self, window_cap: usize) -> Self {
        self.window_cap = Some(window_cap);
        self
    }

    pub fn max_growth_steps(mut self, steps: usize) -> Self {
        self.max_growth_steps = Some(steps);
        self
    }

    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = Some(capacity);
        self
    }

    pub fn recache(mut self, recache: DebounceSettings) -> Self {
        self.recache = Some(recache);
        self
    }

    pub fn build(self) -> Result<CursorSettings, SettingsError> {
        let settings = CursorSettings {
            window_cap: self.window_cap.unwrap_or(DEFAULT_WINDOW_CAP),
            max_growth_steps: self.max_growth_steps.unwrap_or(DEFAULT_MAX_GROWTH_STEPS),
            mailbox_capacity: self.mailbox_capacity.unwrap_or(DEFAULT_MAILBOX_CAPACITY),
            recache: self.recache.unwrap_or_default(),
        };
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_settings() {
        let settings = CursorSettings::default();
        assert_eq!(settings.window_cap(), 50);
        assert_eq!(settings.max_growth_steps(), 10_000);
        assert_eq!(settings.recache().wait(), Duration::from_millis(100));
        assert_eq!(settings.recache().max_wait(), Duration::from_millis(1000));
    }

    #[test]
    fn test_builder() {
        let settings = CursorSettings::builder()
            .window_cap(5)
            .max_growth_steps(3)
            .recache(DebounceSettings::from_millis(10, Some(20)).unwrap())
            .build()
            .unwrap();

        assert_eq!(settings.window_cap(), 5);
        assert_eq!(settings.max_growth_steps(), 3);
        assert_eq!(settings.recache().max_wait(), Duration::from_millis(20));
    }

    #[test]
    fn test_builder_rejects_zero_steps() {
        let err = CursorSettings::builder().max_growth_steps(0).build();
        assert!(matches!(
            err,
            Err(SettingsError::OutOfRange {
                key: "max_growth_steps",
                ..
            })
        ));
    }
}
