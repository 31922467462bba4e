//! Request validation before any codec work.

use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;
use crate::types::EncodeRequest;

/// Validates encode requests and source files.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Check the request's shape.
    ///
    /// Checks:
    /// - Source path is non-empty
    /// - Max dimension and target size are positive
    pub fn validate_request(&self, request: &EncodeRequest) -> Result<(), PipelineError> {
        if request.source_path.as_os_str().is_empty() {
            return Err(PipelineError::invalid(
                "source path must be a non-empty path",
            ));
        }
        if request.max_dimension == 0 {
            return Err(PipelineError::invalid(format!(
                "max dimension must be > 0 for {}",
                request.source_path.display()
            )));
        }
        if request.target_file_size == 0 {
            return Err(PipelineError::invalid(format!(
                "target file size must be > 0 for {}",
                request.source_path.display()
            )));
        }
        Ok(())
    }

    /// Reject source files over the configured size limit.
    pub fn check_file_size(&self, path: &Path, size: u64) -> Result<(), PipelineError> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if size > max_bytes {
            return Err(PipelineError::invalid(format!(
                "{} is too large ({}MB > {}MB)",
                path.display(),
                size / (1024 * 1024),
                self.limits.max_file_size_mb
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::{FieldValues, ImageFormat};
    use std::path::PathBuf;

    fn request(path: &str) -> EncodeRequest {
        EncodeRequest {
            source_path: PathBuf::from(path),
            output_folder: PathBuf::from("/out"),
            max_dimension: 100,
            format: ImageFormat::Jpeg,
            target_file_size: 1000,
            size_tolerance: 10,
            filename_template: "{filename}".to_string(),
            field_values: FieldValues::new(),
            sequence_index: 0,
            total: 1,
        }
    }

    #[test]
    fn test_valid_request() {
        let validator = Validator::new(LimitsConfig::default());
        assert!(validator.validate_request(&request("a.jpg")).is_ok());
    }

    #[test]
    fn test_empty_path_is_invalid_input() {
        let validator = Validator::new(LimitsConfig::default());
        let err = validator.validate_request(&request("")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_zero_dimension_and_size_rejected() {
        let validator = Validator::new(LimitsConfig::default());

        let mut req = request("a.jpg");
        req.max_dimension = 0;
        assert!(validator.validate_request(&req).is_err());

        let mut req = request("a.jpg");
        req.target_file_size = 0;
        assert!(validator.validate_request(&req).is_err());
    }

    #[test]
    fn test_file_size_limit() {
        let validator = Validator::new(LimitsConfig {
            max_file_size_mb: 1,
            ..LimitsConfig::default()
        });
        let path = Path::new("big.jpg");
        assert!(validator.check_file_size(path, 1024 * 1024).is_ok());
        let err = validator.check_file_size(path, 3 * 1024 * 1024).unwrap_err();
        assert!(err.to_string().contains("3MB > 1MB"));
    }
}
