use crate::utils::error::{ReleaseError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> ReleaseError {
    ReleaseError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// `api_base` style values: absolute http(s) URLs only.
pub fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "URL cannot be empty"));
    }

    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, value, format!("Unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_path(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(invalid(field, value, "Path cannot be empty"))
    } else if value.contains('\0') {
        Err(invalid(field, value, "Path contains null bytes"))
    } else {
        Ok(())
    }
}

pub fn validate_required_field<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ReleaseError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn validate_non_empty_string(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

/// Names passed to the release process environment.
pub fn validate_env_var_name(field: &str, name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(invalid(
            field,
            name,
            "Environment variable names may only contain letters, digits and '_'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_base", "https://example.com").is_ok());
        assert!(validate_url("api_base", "http://example.com/api").is_ok());
        assert!(validate_url("api_base", "").is_err());
        assert!(validate_url("api_base", "invalid-url").is_err());
        assert!(validate_url("api_base", "ftp://example.com").is_err());
    }

    #[test]
    fn test_invalid_value_names_field() {
        let err = validate_url("environments.testing.api_base", "ftp://example.com").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value 'ftp://example.com' for environments.testing.api_base: Unsupported URL scheme: ftp"
        );
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("Graph".to_string());
        let missing: Option<String> = None;
        assert_eq!(validate_required_field("head_title", &present).unwrap(), "Graph");
        assert!(matches!(
            validate_required_field("api_base", &missing),
            Err(ReleaseError::MissingConfigError { field }) if field == "api_base"
        ));
    }

    #[test]
    fn test_validate_env_var_name() {
        assert!(validate_env_var_name("env", "API_BASE_URL").is_ok());
        assert!(validate_env_var_name("env", "1ABC").is_err());
        assert!(validate_env_var_name("env", "BAD-NAME").is_err());
        assert!(validate_env_var_name("env", "").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("dir", "web").is_ok());
        assert!(validate_path("dir", "").is_err());
        assert!(validate_path("dir", "we\0b").is_err());
        assert!(validate_non_empty_string("head_title", "  ").is_err());
    }
}
