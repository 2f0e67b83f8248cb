pub mod debounce;
pub mod error;
pub mod validated;
pub mod validator;

pub use debounce::DebounceSettings;
pub use error::SettingsError;
pub use validated::{CursorSettings, CursorSettingsBuilder};
pub use validator::{SettingsLoader, from_env};
