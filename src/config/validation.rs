use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Cleanup interval must be positive: interval_hours = {0}")]
    InvalidInterval(u32),

    #[error("Cleanup stop timeout must be positive: stop_timeout_secs = {0}")]
    InvalidStopTimeout(u64),

    #[error("Upload root must not be empty")]
    EmptyUploadRoot,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_uploads(config)?;
    validate_cleanup(config)?;
    Ok(())
}

fn validate_uploads(config: &Config) -> Result<(), ValidationError> {
    if config.uploads.root.as_os_str().is_empty() {
        return Err(ValidationError::EmptyUploadRoot);
    }
    Ok(())
}

/// `max_age_days = 0` is allowed: every file older than the scan instant goes.
fn validate_cleanup(config: &Config) -> Result<(), ValidationError> {
    if config.cleanup.interval_hours == 0 {
        return Err(ValidationError::InvalidInterval(0));
    }

    if config.cleanup.stop_timeout_secs == 0 {
        return Err(ValidationError::InvalidStopTimeout(0));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_max_age_is_valid() {
        let mut config = Config::default();
        config.cleanup.max_age_days = 0;

        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_interval() {
        let mut config = Config::default();
        config.cleanup.interval_hours = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidInterval(0))));
    }

    #[test]
    fn test_zero_stop_timeout() {
        let mut config = Config::default();
        config.cleanup.stop_timeout_secs = 0;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidStopTimeout(0))));
    }

    #[test]
    fn test_empty_upload_root() {
        let mut config = Config::default();
        config.uploads.root = PathBuf::new();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyUploadRoot)));
    }
}
