use crate::utils::error::{Result, VerifyError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(VerifyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(VerifyError::InvalidConfigValueError {
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
    if value < min || value > max {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// An ID range must name at least one token.
pub fn validate_id_range(field_name: &str, start: u64, end: u64) -> Result<()> {
    if start > end {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}..{}", start, end),
            reason: "Range start must not exceed range end".to_string(),
        });
    }
    Ok(())
}

/// The URL template must contain exactly one `{id}` placeholder.
pub fn validate_url_template(field_name: &str, template: &str) -> Result<()> {
    if template.matches("{id}").count() != 1 {
        return Err(VerifyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: template.to_string(),
            reason: "Template must contain exactly one {id} placeholder".to_string(),
        });
    }
    validate_url(field_name, &template.replace("{id}", "0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_base", "https://api.fxhash.xyz").is_ok());
        assert!(validate_url("api_base", "http://localhost:8080").is_ok());
        assert!(validate_url("api_base", "").is_err());
        assert!(validate_url("api_base", "invalid-url").is_err());
        assert!(validate_url("api_base", "ipfs://QmHash").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("render.timeout_seconds", 60, 1, 600).is_ok());
        assert!(validate_range("render.timeout_seconds", 0, 1, 600).is_err());
        assert!(validate_range("render.timeout_seconds", 601, 1, 600).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("render.retries", 3, 1).is_ok());
        assert!(validate_positive_number("render.retries", 0, 1).is_err());
    }

    #[test]
    fn test_validate_id_range_and_template() {
        assert!(validate_id_range("source.range", 30661, 30661).is_ok());
        assert!(validate_id_range("source.range", 31600, 30661).is_err());
        assert!(
            validate_url_template("source.url_template", "https://www.fxhash.xyz/generative/{id}")
                .is_ok()
        );
        assert!(
            validate_url_template("source.url_template", "https://www.fxhash.xyz/generative/")
                .is_err()
        );
    }
}
