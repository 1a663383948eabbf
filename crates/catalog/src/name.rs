use pricetide_core::{DomainError, DomainResult};

/// Trim a display name and enforce the non-blank / max-length rules.
pub fn normalize_name(raw: &str, max_chars: usize, what: &str) -> DomainResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid(format!("{what} name must not be blank")));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::invalid(format!(
            "{what} name must not exceed {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive name equality used for per-organization uniqueness.
pub fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
