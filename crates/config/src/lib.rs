//! booklend configuration
//!
//! Validated library settings and resolution of the data directory.
//!
//! # Example
//!
//! ```rust
//! use booklend_config::LibrarySettings;
//!
//! let mut settings = LibrarySettings::default();
//! assert!(settings.set_maximum_borrow_days(0).is_err());
//! assert_eq!(settings.maximum_borrow_days(), 30);
//! ```

mod error;
mod manager;
mod settings;
mod validation;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{ConfigManager, DATA_DIR_ENV};
pub use settings::LibrarySettings;
pub use validation::{ConfigSection, Validator};
