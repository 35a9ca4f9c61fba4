pub mod ip;
pub mod retry;
pub mod url_validator;

/// Custom alias length bounds, inclusive
pub const ALIAS_MIN_LEN: usize = 3;
pub const ALIAS_MAX_LEN: usize = 20;

/// `[A-Za-z0-9_-]{3,20}`
pub fn is_valid_alias(alias: &str) -> bool {
    (ALIAS_MIN_LEN..=ALIAS_MAX_LEN).contains(&alias.len())
        && alias
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_pattern() {
        assert!(is_valid_alias("abc"));
        assert!(is_valid_alias("my-link_2026"));
        assert!(is_valid_alias(&"a".repeat(20)));

        assert!(!is_valid_alias("ab"));
        assert!(!is_valid_alias(&"a".repeat(21)));
        assert!(!is_valid_alias("has space"));
        assert!(!is_valid_alias("slash/es"));
        assert!(!is_valid_alias("ünïcode"));
        assert!(!is_valid_alias(""));
    }
}
