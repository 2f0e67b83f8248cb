use crate::settings::{
    debounce::DebounceSettings,
    error::SettingsError,
    validated::{CursorSettings, CursorSettingsBuilder},
};
use std::collections::HashMap;
use tracing::{info, warn};

pub const ENV_PREFIX: &str = "PAGER_";

const WINDOW_CAP: &str = "PAGER_WINDOW_CAP";
const MAX_GROWTH_STEPS: &str = "PAGER_MAX_GROWTH_STEPS";
const MAILBOX_CAPACITY: &str = "PAGER_MAILBOX_CAPACITY";
const DEBOUNCE_WAIT_MS: &str = "PAGER_DEBOUNCE_WAIT_MS";
const DEBOUNCE_MAX_WAIT_MS: &str = "PAGER_DEBOUNCE_MAX_WAIT_MS";

/// Loads cursor settings from `KEY=VALUE` pairs such as the process
/// environment. Unknown `PAGER_*` keys are reported and ignored.
pub struct SettingsLoader<'a> {
    vars: &'a HashMap<String, String>,
}

impl<'a> SettingsLoader<'a> {
    pub fn new(vars: &'a HashMap<String, String>) -> Self {
        Self { vars }
    }

    pub fn load(&self) -> Result<CursorSettings, SettingsError> {
        let mut builder = CursorSettingsBuilder::default();
        let mut errors: Vec<String> = Vec::new();

        if let Some(v) = self.number(WINDOW_CAP, &mut errors) {
            builder = builder.window_cap(v as usize);
        }
        if let Some(v) = self.number(MAX_GROWTH_STEPS, &mut errors) {
            builder = builder.max_growth_steps(v as usize);
        }
        if let Some(v) = self.number(MAILBOX_CAPACITY, &mut errors) {
            builder = builder.mailbox_capacity(v as usize);
        }

        let wait = self.number(DEBOUNCE_WAIT_MS, &mut errors);
        let max_wait = self.number(DEBOUNCE_MAX_WAIT_MS, &mut errors);
        match (wait, max_wait) {
            (Some(wait), max_wait) => match DebounceSettings::from_millis(wait, max_wait) {
                Ok(debounce) => builder = builder.recache(debounce),
                Err(e) => errors.push(e.to_string()),
            },
            (None, Some(_)) => {
                warn!("{DEBOUNCE_MAX_WAIT_MS} is ignored without {DEBOUNCE_WAIT_MS}");
            }
            (None, None) => {}
        }

        self.report_unknown_keys();

        if !errors.is_empty() {
            return Err(SettingsError::ValidationFailed(errors));
        }

        let settings = builder.build()?;
        info!(
            window_cap = settings.window_cap,
            max_growth_steps = settings.max_growth_steps,
            wait_ms = settings.recache.wait().as_millis() as u64,
            max_wait_ms = settings.recache.max_wait().as_millis() as u64,
            "Cursor settings loaded"
        );
        Ok(settings)
    }

    fn number(&self, key: &str, errors: &mut Vec<String>) -> Option<u64> {
        let raw = self.vars.get(key)?;
        match raw.trim().parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(
                    SettingsError::InvalidNumber {
                        key: key.to_string(),
                        value: raw.clone(),
                    }
                    .to_string(),
                );
                None
            }
        }
    }

    fn report_unknown_keys(&self) {
        const KNOWN: [&str; 5] = [
            WINDOW_CAP,
            MAX_GROWTH_STEPS,
            MAILBOX_CAPACITY,
            DEBOUNCE_WAIT_MS,
            DEBOUNCE_MAX_WAIT_MS,
        ];
        for key in self.vars.keys() {
            if key.starts_with(ENV_PREFIX) && !KNOWN.contains(&key.as_str()) {
                warn!(key = %key, "Unknown cursor setting ignored");
            }
        }
    }
}

/// Loads settings from the process environment.
pub fn from_env() -> Result<CursorSettings, SettingsError> {
    let vars: HashMap<String, String> = std::env::vars()
        .filter(|(k, _)| k.starts_with(ENV_PREFIX))
        .collect();
    SettingsLoader::new(&vars).load()
}
