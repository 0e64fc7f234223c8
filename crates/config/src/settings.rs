//! Library settings section

use crate::validation::{ConfigSection, ValidationError, Validator};
use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

const DEFAULT_LIBRARY_NAME: &str = "Atatürk Kültür Merkezi";
const DEFAULT_LIBRARY_LOCATION: &str = "İstanbul, Türkiye";
const DEFAULT_MAXIMUM_BORROW_DAYS: u32 = 30;

/// Name, location and lending policy of the library
///
/// `maximum_borrow_days` is always greater than zero: the constructor, the
/// setter and deserialization all reject zero or negative values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SettingsRecord", into = "SettingsRecord")]
pub struct LibrarySettings {
    library_name: String,
    library_location: String,
    maximum_borrow_days: u32,
}

impl LibrarySettings {
    /// Creates validated settings
    pub fn new(
        library_name: impl Into<String>,
        library_location: impl Into<String>,
        maximum_borrow_days: u32,
    ) -> ConfigResult<Self> {
        let settings = Self {
            library_name: library_name.into(),
            library_location: library_location.into(),
            maximum_borrow_days,
        };
        settings
            .validate()
            .map_err(|errors| ConfigError::from_validation(&errors))?;
        Ok(settings)
    }

    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    pub fn library_location(&self) -> &str {
        &self.library_location
    }

    pub fn maximum_borrow_days(&self) -> u32 {
        self.maximum_borrow_days
    }

    pub fn set_library_name(&mut self, name: impl Into<String>) {
        self.library_name = name.into();
    }

    pub fn set_library_location(&mut self, location: impl Into<String>) {
        self.library_location = location.into();
    }

    /// Changes the lending period, leaving settings untouched on error
    pub fn set_maximum_borrow_days(&mut self, days: u32) -> ConfigResult<()> {
        Validator::positive(days, "library.maximum_borrow_days")
            .map_err(|e| ConfigError::from_validation(&[e]))?;
        self.maximum_borrow_days = days;
        Ok(())
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            library_name: DEFAULT_LIBRARY_NAME.to_string(),
            library_location: DEFAULT_LIBRARY_LOCATION.to_string(),
            maximum_borrow_days: DEFAULT_MAXIMUM_BORROW_DAYS,
        }
    }
}

impl ConfigSection for LibrarySettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![Validator::positive(
            self.maximum_borrow_days,
            "library.maximum_borrow_days",
        )])
    }
}

/// On-disk shape of the settings store
///
/// Kept signed so a hand-edited negative value is reported as a validation
/// failure rather than a type error.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsRecord {
    library_name: String,
    library_location: String,
    maximum_borrow_days: i64,
}

impl TryFrom<SettingsRecord> for LibrarySettings {
    type Error = ConfigError;

    fn try_from(record: SettingsRecord) -> Result<Self, Self::Error> {
        Validator::in_range(
            record.maximum_borrow_days,
            1,
            i64::from(u32::MAX),
            "library.maximum_borrow_days",
        )
        .map_err(|e| ConfigError::from_validation(&[e]))?;

        let days = u32::try_from(record.maximum_borrow_days).map_err(|_| {
            ConfigError::ValidationError("maximum_borrow_days out of range".to_string())
        })?;
        Self::new(record.library_name, record.library_location, days)
    }
}

impl From<LibrarySettings> for SettingsRecord {
    fn from(settings: LibrarySettings) -> Self {
        Self {
            library_name: settings.library_name,
            library_location: settings.library_location,
            maximum_borrow_days: i64::from(settings.maximum_borrow_days),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let settings = LibrarySettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.maximum_borrow_days(), 30);
    }

    #[test]
    fn test_new_rejects_zero_days() {
        let result = LibrarySettings::new("Branch", "Ankara", 0);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_setter_rejects_zero_and_keeps_value() {
        let mut settings = LibrarySettings::default();
        assert!(settings.set_maximum_borrow_days(0).is_err());
        assert_eq!(settings.maximum_borrow_days(), 30);

        settings.set_maximum_borrow_days(14).unwrap();
        assert_eq!(settings.maximum_borrow_days(), 14);
    }

    #[test]
    fn test_string_fields_unconstrained() {
        let mut settings = LibrarySettings::default();
        settings.set_library_name("");
        settings.set_library_location("");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(LibrarySettings::default()).unwrap();
        assert_eq!(json["libraryName"], "Atatürk Kültür Merkezi");
        assert_eq!(json["libraryLocation"], "İstanbul, Türkiye");
        assert_eq!(json["maximumBorrowDays"], 30);
    }

    #[test]
    fn test_deserialize_rejects_non_positive_days() {
        let zero = r#"{"libraryName":"a","libraryLocation":"b","maximumBorrowDays":0}"#;
        assert!(serde_json::from_str::<LibrarySettings>(zero).is_err());

        let negative = r#"{"libraryName":"a","libraryLocation":"b","maximumBorrowDays":-4}"#;
        assert!(serde_json::from_str::<LibrarySettings>(negative).is_err());

        let ok = r#"{"libraryName":"a","libraryLocation":"b","maximumBorrowDays":7}"#;
        let settings: LibrarySettings = serde_json::from_str(ok).unwrap();
        assert_eq!(settings.maximum_borrow_days(), 7);
    }
}
