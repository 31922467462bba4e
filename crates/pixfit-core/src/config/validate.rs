//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "output.max_dimension must be > 0".into(),
            ));
        }
        if self.output.target_file_size == 0 {
            return Err(ConfigError::ValidationError(
                "output.target_file_size must be > 0".into(),
            ));
        }
        if self.output.filename_template.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "output.filename_template must not be empty".into(),
            ));
        }
        if self.limits.codec_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.codec_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_dimension() {
        let mut config = Config::default();
        config.output.max_dimension = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_dimension"));
    }

    #[test]
    fn test_validate_rejects_zero_target_size() {
        let mut config = Config::default();
        config.output.target_file_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("target_file_size"));
    }

    #[test]
    fn test_validate_rejects_blank_template() {
        let mut config = Config::default();
        config.output.filename_template = "   ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("filename_template"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.codec_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("codec_timeout_ms"));
    }

    #[test]
    fn test_zero_tolerance_is_allowed() {
        let mut config = Config::default();
        config.output.size_tolerance = 0;
        assert!(config.validate().is_ok());
    }
}
