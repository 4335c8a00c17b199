use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, Result, SongbookError};

/// Environment variable configuration constants
pub struct EnvVars;

impl EnvVars {
    pub const DATABASE_PATH: &'static str = "SONGBOOK_DATABASE_PATH";
    pub const POOL_SIZE: &'static str = "SONGBOOK_POOL_SIZE";
    pub const BUSY_TIMEOUT_MS: &'static str = "SONGBOOK_BUSY_TIMEOUT_MS";
    pub const OPERATION_TIMEOUT_SECONDS: &'static str = "SONGBOOK_OPERATION_TIMEOUT_SECONDS";
    pub const DEFAULT_PAGE_LIMIT: &'static str = "SONGBOOK_DEFAULT_PAGE_LIMIT";
    pub const DEFAULT_VERSE_COUNT: &'static str = "SONGBOOK_DEFAULT_VERSE_COUNT";

    // Special environment variables
    pub const DOCKER: &'static str = "DOCKER";
}

/// Reads `SONGBOOK_*` overrides. Unset or blank variables are `None`;
/// malformed ones are `ConfigError::InvalidValue` naming the variable.
pub struct EnvParser;

impl EnvParser {
    pub fn parse_string(var_name: &str) -> Result<Option<String>> {
        let raw = match env::var(var_name) {
            Ok(raw) => raw,
            Err(env::VarError::NotPresent) => return Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(invalid(var_name, "<not valid UTF-8>".to_string()))
            }
        };

        let value = raw.trim();
        Ok((!value.is_empty()).then(|| value.to_string()))
    }

    /// With `should_exist`, a path that is not on disk is rejected.
    pub fn parse_path(var_name: &str, should_exist: bool) -> Result<Option<PathBuf>> {
        let Some(path) = Self::parse_string(var_name)?.map(PathBuf::from) else {
            return Ok(None);
        };

        if should_exist && !path.exists() {
            return Err(invalid(var_name, format!("{} (no such path)", path.display())));
        }
        Ok(Some(path))
    }

    /// Parse a number and require `min <= value <= max`.
    pub fn parse_in_range<T>(var_name: &str, min: T, max: T) -> Result<Option<T>>
    where
        T: FromStr + PartialOrd + Display,
    {
        let Some(raw) = Self::parse_string(var_name)? else {
            return Ok(None);
        };

        let value: T = raw
            .parse()
            .map_err(|_| invalid(var_name, format!("'{}' (expected a number)", raw)))?;

        if value < min || value > max {
            return Err(invalid(
                var_name,
                format!("{} (expected {}..={})", value, min, max),
            ));
        }
        Ok(Some(value))
    }

    /// Get all SONGBOOK environment variables for display
    pub fn get_all_songbook_vars() -> Vec<(String, String)> {
        env::vars()
            .filter(|(key, _)| key.starts_with("SONGBOOK_"))
            .collect()
    }
}

fn invalid(var_name: &str, value: String) -> SongbookError {
    ConfigError::InvalidValue {
        field: var_name.to_string(),
        value,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_parse_string_trims_and_skips_blank() {
        env::set_var("SONGBOOK_TEST_STRING", "  value  ");
        env::set_var("SONGBOOK_TEST_BLANK", "   ");

        assert_eq!(
            EnvParser::parse_string("SONGBOOK_TEST_STRING").unwrap(),
            Some("value".to_string())
        );
        assert_eq!(EnvParser::parse_string("SONGBOOK_TEST_BLANK").unwrap(), None);
        assert_eq!(EnvParser::parse_string("SONGBOOK_TEST_UNSET").unwrap(), None);

        env::remove_var("SONGBOOK_TEST_STRING");
        env::remove_var("SONGBOOK_TEST_BLANK");
    }

    #[test]
    fn test_parse_in_range() {
        env::set_var("SONGBOOK_TEST_NUM_VALID", "42");
        env::set_var("SONGBOOK_TEST_NUM_OUT_OF_RANGE", "150");
        env::set_var("SONGBOOK_TEST_NUM_INVALID", "not_a_number");

        assert_eq!(
            EnvParser::parse_in_range::<u64>("SONGBOOK_TEST_NUM_VALID", 1, 100).unwrap(),
            Some(42)
        );
        assert_eq!(
            EnvParser::parse_in_range::<usize>("SONGBOOK_TEST_NUM_VALID", 1, 64).unwrap(),
            Some(42)
        );
        assert!(EnvParser::parse_in_range::<u32>("SONGBOOK_TEST_NUM_OUT_OF_RANGE", 1, 100).is_err());
        assert_eq!(
            EnvParser::parse_in_range::<u64>("SONGBOOK_TEST_NUM_NOT_SET", 1, 100).unwrap(),
            None
        );

        let err = EnvParser::parse_in_range::<u64>("SONGBOOK_TEST_NUM_INVALID", 1, 100).unwrap_err();
        assert!(matches!(
            err,
            SongbookError::Config(ConfigError::InvalidValue { ref field, .. })
                if field == "SONGBOOK_TEST_NUM_INVALID"
        ));

        env::remove_var("SONGBOOK_TEST_NUM_VALID");
        env::remove_var("SONGBOOK_TEST_NUM_OUT_OF_RANGE");
        env::remove_var("SONGBOOK_TEST_NUM_INVALID");
    }

    #[test]
    fn test_parse_path_existence() {
        env::set_var("SONGBOOK_TEST_PATH_MISSING", "/definitely/not/here.db");

        assert!(EnvParser::parse_path("SONGBOOK_TEST_PATH_MISSING", true).is_err());
        assert_eq!(
            EnvParser::parse_path("SONGBOOK_TEST_PATH_MISSING", false).unwrap(),
            Some(PathBuf::from("/definitely/not/here.db"))
        );

        env::remove_var("SONGBOOK_TEST_PATH_MISSING");
    }
}
