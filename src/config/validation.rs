use std::path::Path;
use crate::error::{ConfigError, Result};

const DB_EXTENSIONS: [&str; 3] = ["db", "sqlite", "sqlite3"];

/// Centralized configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate numeric range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ConfigError::InvalidValue {
                field: field_name.to_string(),
                value: format!("{} (expected {}..={})", value, min, max),
            }
            .into());
        }
        Ok(())
    }

    /// Database files must end in `.db`, `.sqlite` or `.sqlite3`.
    pub fn validate_db_path(path: &Path) -> Result<()> {
        let known = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| DB_EXTENSIONS.contains(&ext));

        if !known {
            return Err(ConfigError::InvalidValue {
                field: "database_path".to_string(),
                value: format!("{} (expected a .db, .sqlite or .sqlite3 file)", path.display()),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SongbookError;
    use std::path::PathBuf;

    #[test]
    fn test_validate_range() {
        assert!(ConfigValidator::validate_range(5u64, 1u64, 10u64, "test").is_ok());
        let err = ConfigValidator::validate_range(0usize, 1, 64, "pool_size").unwrap_err();
        assert!(matches!(
            err,
            SongbookError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "pool_size"
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid value for pool_size: 0 (expected 1..=64)"
        );
        assert!(ConfigValidator::validate_range(15u64, 1u64, 10u64, "test").is_err());
        assert!(ConfigValidator::validate_range(0u64, 1u64, 10u64, "test").is_err());
    }

    #[test]
    fn test_validate_db_path() {
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("songbook.db")).is_ok());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("songbook.sqlite")).is_ok());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("songbook.sqlite3")).is_ok());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("songbook.txt")).is_err());
        assert!(ConfigValidator::validate_db_path(&PathBuf::from("songbook")).is_err());
    }
}
