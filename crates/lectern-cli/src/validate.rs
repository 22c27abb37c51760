use crate::output::CliError;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_COMMENT_CHARS: usize = 8_192;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: &'static str,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: &'static str,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(
            format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            self.suggestion.clone(),
            self.code,
        )
    }
}

/// Item names are required, trimmed, single-line, and bounded.
pub fn validate_name(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::new(
            "name",
            s,
            "must not be empty",
            "provide a non-empty --name",
            "invalid_name",
        ));
    }
    if s.trim() != s {
        return Err(ValidationError::new(
            "name",
            s,
            "must not start or end with whitespace",
            "trim leading/trailing whitespace from --name",
            "invalid_name",
        ));
    }
    if s.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            "name",
            s,
            format!("must be <= {MAX_NAME_LEN} characters"),
            "shorten the name",
            "invalid_name",
        ));
    }
    if s.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "name",
            s,
            "must not contain control characters",
            "remove control characters from the name",
            "invalid_name",
        ));
    }
    Ok(())
}

pub fn validate_comment(s: &str) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::new(
            "comment",
            s,
            "must not be empty",
            "write some text for the comment",
            "invalid_comment",
        ));
    }
    let count = s.chars().count();
    if count > MAX_COMMENT_CHARS {
        return Err(ValidationError::new(
            "comment",
            format!("{count} chars"),
            format!("must be <= {MAX_COMMENT_CHARS} characters"),
            "split the comment up",
            "invalid_comment",
        ));
    }
    if s.chars().any(|ch| ch.is_control() && ch != '\n' && ch != '\t') {
        return Err(ValidationError::new(
            "comment",
            s,
            "must not contain control characters",
            "use plain UTF-8 text",
            "invalid_comment",
        ));
    }
    Ok(())
}

/// Minimal shape check: something before and after a single `@`.
pub fn validate_email(s: &str) -> Result<(), ValidationError> {
    let valid = s.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !s.contains(' ')
    });
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new(
            "email",
            s,
            "must look like name@domain",
            "pass a full email address to --email",
            "invalid_email",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(validate_name("Kubernetes basics").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(" padded").is_err());
        assert!(validate_name("line\nbreak").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn comment_allows_newlines() {
        assert!(validate_comment("first\nsecond\tindent").is_ok());
        assert!(validate_comment("").is_err());
        assert!(validate_comment("bell\u{7}").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@b@c").is_err());
    }

    #[test]
    fn cli_error_names_field() {
        let err = validate_name("").unwrap_err().to_cli_error();
        assert!(err.message.starts_with("invalid name"));
        assert_eq!(err.error_code.as_deref(), Some("invalid_name"));
    }
}
