pub mod settings;

pub use settings::{CursorSettings, DebounceSettings, SettingsError};
