//! 目标 URL 校验
//!
//! 只接受带主机名的绝对 http(s) URL

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlValidationError {
    EmptyUrl,
    InvalidProtocol(String),
    MissingHost,
    InvalidFormat(String),
}

impl std::fmt::Display for UrlValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUrl => write!(f, "URL cannot be empty"),
            Self::InvalidProtocol(scheme) => write!(
                f,
                "Invalid protocol: {}:. Only http:// and https:// are allowed",
                scheme
            ),
            Self::MissingHost => write!(f, "URL must contain a host"),
            Self::InvalidFormat(msg) => write!(f, "Invalid URL format: {}", msg),
        }
    }
}

impl std::error::Error for UrlValidationError {}

/// Parse `url` and check it is an absolute http(s) URL
///
/// Leading and trailing whitespace is ignored. Schemes such as
/// `javascript:`, `data:` or `ftp:` are rejected.
pub fn validate_url(url: &str) -> Result<Url, UrlValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(UrlValidationError::EmptyUrl);
    }

    let parsed = Url::parse(url).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::InvalidProtocol(other.to_string())),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_url("http://example.com").is_ok());
        assert!(validate_url("https://example.com/path?query=1#top").is_ok());
        assert!(validate_url("http://localhost:8080").is_ok());
        assert!(validate_url("  https://example.com  ").is_ok());
        assert!(validate_url("HTTPS://EXAMPLE.COM").is_ok());
    }

    #[test]
    fn test_serialized_form_is_header_safe() {
        let cases = [
            ("https://docs.rs", "https://docs.rs/"),
            ("HTTPS://EXAMPLE.COM/Path", "https://example.com/Path"),
            ("https://example.com/a\nb", "https://example.com/ab"),
            ("https://example.com/\tx?q=1", "https://example.com/x?q=1"),
            ("https://example.com/café", "https://example.com/caf%C3%A9"),
        ];
        for (input, expected) in cases {
            let url = validate_url(input).unwrap();
            assert_eq!(url.as_str(), expected);
            assert!(url.as_str().bytes().all(|b| b.is_ascii_graphic()), "{input:?}");
        }
    }

    #[test]
    fn test_rejected_schemes() {
        for url in [
            "javascript:alert(1)",
            "data:text/html,<script>alert(1)</script>",
            "file:///etc/passwd",
            "ftp://example.com",
            "mailto:test@example.com",
        ] {
            assert!(
                matches!(validate_url(url), Err(UrlValidationError::InvalidProtocol(_))),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed() {
        assert_eq!(validate_url(""), Err(UrlValidationError::EmptyUrl));
        assert_eq!(validate_url("   "), Err(UrlValidationError::EmptyUrl));
        assert!(matches!(
            validate_url("not a url"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(matches!(
            validate_url("example.com/path"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
        assert!(validate_url("http://").is_err());
    }
}
