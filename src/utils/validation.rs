use crate::utils::error::{AnalyticsError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 也會在這裡被擋下
    if !(value >= min && value <= max) {
        return Err(AnalyticsError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_extensions_list(field_name: &str, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(AnalyticsError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    for ext in extensions {
        if ext.trim().is_empty() || ext.contains('.') {
            return Err(AnalyticsError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: ext.clone(),
                reason: "Extensions are listed without the leading dot, e.g. \"csv\"".to_string(),
            });
        }
    }
    Ok(())
}

/// Rejects uploads whose extension is not in `allowed_extensions` (case-insensitive).
pub fn check_file_extension(filename: &str, allowed_extensions: &[String]) -> Result<()> {
    let accepted = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false);

    if accepted {
        Ok(())
    } else {
        Err(AnalyticsError::UnsupportedFileType {
            filename: filename.to_string(),
        })
    }
}
