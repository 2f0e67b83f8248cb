use std::collections::HashMap;
use std::fs;
use std::path::Path;

use engine_config::{CursorSettings, settings::SettingsLoader};

use crate::error::CliError;

/// Environment variables from the process, optionally overlaid with a
/// `.env` style file.
#[derive(Debug, Clone, Default)]
pub struct EnvManager {
    vars: HashMap<String, String>,
}

impl EnvManager {
    pub fn new() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Load variables from a .env file; they win over the process environment.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read env file {}: {}", path.display(), e))
        })?;

        self.parse_env_content(&content)
    }

    pub fn cursor_settings(&self) -> Result<CursorSettings, CliError> {
        Ok(SettingsLoader::new(&self.vars).load()?)
    }

    fn parse_env_content(&mut self, content: &str) -> Result<(), CliError> {
        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid env file: malformed line {} (expected KEY=VALUE)",
                    line_num + 1
                )));
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Invalid env file: empty key at line {}",
                    line_num + 1
                )));
            }

            self.vars.insert(key.to_string(), Self::unquote_value(value));
        }

        Ok(())
    }

    fn unquote_value(value: &str) -> String {
        let value = value.trim();
        for quote in ['"', '\''] {
            if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
                return value[1..value.len() - 1].to_string();
            }
        }
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pager_settings() {
        let mut env = EnvManager::default();
        let content = r#"
# Cursor tuning
PAGER_WINDOW_CAP=20
PAGER_DEBOUNCE_WAIT_MS="50"
        "#;

        env.parse_env_content(content).unwrap();
        let settings = env.cursor_settings().unwrap();
        assert_eq!(settings.window_cap(), 20);
        assert_eq!(settings.recache().wait().as_millis(), 50);
    }

    #[test]
    fn test_parse_quoted_values() {
        let mut env = EnvManager::default();
        let content = r#"
QUOTED="value with spaces"
SINGLE='single quoted'
UNQUOTED=no_spaces
        "#;

        env.parse_env_content(content).unwrap();
        assert_eq!(env.vars.get("QUOTED").unwrap(), "value with spaces");
        assert_eq!(env.vars.get("SINGLE").unwrap(), "single quoted");
        assert_eq!(env.vars.get("UNQUOTED").unwrap(), "no_spaces");
    }

    #[test]
    fn test_invalid_env_format() {
        let mut env = EnvManager::default();
        assert!(env.parse_env_content("INVALID LINE WITHOUT EQUALS").is_err());
    }

    #[test]
    fn test_invalid_setting_is_reported() {
        let mut env = EnvManager::default();
        env.parse_env_content("PAGER_MAX_GROWTH_STEPS=lots").unwrap();
        assert!(matches!(env.cursor_settings(), Err(CliError::Settings(_))));
    }
}
