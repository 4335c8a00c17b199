use chrono::NaiveDate;
use url::Url;

use songbook::SongbookError;

pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Release dates are stored as text but must be well-formed `YYYY-MM-DD`.
pub fn validate_release_date(value: &str) -> Result<(), SongbookError> {
    NaiveDate::parse_from_str(value, RELEASE_DATE_FORMAT)
        .map(|_| ())
        .map_err(|e| {
            SongbookError::Validation(format!(
                "Invalid release date '{}': {} (expected YYYY-MM-DD)",
                value, e
            ))
        })
}

pub fn validate_link(value: &str) -> Result<(), SongbookError> {
    Url::parse(value).map(|_| ()).map_err(|e| {
        SongbookError::Validation(format!("Invalid link URL '{}': {}", value, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_release_date() {
        assert!(validate_release_date("1971-09-09").is_ok());
        assert!(validate_release_date("1971-13-01").is_err());
        assert!(validate_release_date("09.09.1971").is_err());
        assert!(validate_release_date("").is_err());
    }

    #[test]
    fn test_validate_link() {
        assert!(validate_link("https://www.youtube.com/watch?v=YkgkThdzX-8").is_ok());
        assert!(validate_link("not a url").is_err());
    }
}
