//! Tool configuration read from `cancelcheck.toml`.

pub mod loader;
pub mod schema;

pub use loader::{discover, load_from_path, load_from_str, ConfigError, CONFIG_FILE_NAME};
pub use schema::{Config, FilesConfig, FixConfig, RuleConfig, ValidationError, ValidationIssue};
