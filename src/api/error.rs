//! HTTP mapping of `LinktallyError`

use actix_web::http::StatusCode;
use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpResponse, ResponseError};
use tracing::{debug, error, warn};

use super::types::ErrorResponse;
use crate::errors::LinktallyError;

/// Seconds a client should wait after `CodeSpaceExhausted`
pub const RETRY_AFTER_SECS: u32 = 1;

impl ResponseError for LinktallyError {
    fn status_code(&self) -> StatusCode {
        match self {
            LinktallyError::InvalidUrlFormat(_)
            | LinktallyError::InvalidAliasFormat(_)
            | LinktallyError::Validation(_) => StatusCode::BAD_REQUEST,
            LinktallyError::AliasInUse(_) => StatusCode::CONFLICT,
            LinktallyError::CodeSpaceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            LinktallyError::NotFound(_) => StatusCode::NOT_FOUND,
            LinktallyError::Expired(_) => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut builder = HttpResponse::build(status);

        if matches!(self, LinktallyError::CodeSpaceExhausted(_)) {
            builder.insert_header((RETRY_AFTER, RETRY_AFTER_SECS.to_string()));
        }

        // 服务端错误不向调用方暴露细节
        let message = if self.is_client_error() {
            debug!("Request rejected ({}): {}", status.as_u16(), self);
            self.message().to_string()
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!("Request deferred: {}", self);
            self.message().to_string()
        } else {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        };

        builder.json(ErrorResponse::new(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LinktallyError::invalid_url_format("x"), 400),
            (LinktallyError::invalid_alias_format("x"), 400),
            (LinktallyError::validation("x"), 400),
            (LinktallyError::alias_in_use("x"), 409),
            (LinktallyError::code_space_exhausted("x"), 503),
            (LinktallyError::not_found("x"), 404),
            (LinktallyError::expired("x"), 410),
            (LinktallyError::store_unavailable("x"), 500),
            (LinktallyError::duplicate_code("x"), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{:?}", err);
        }
    }

    #[test]
    fn test_retry_after_only_on_exhaustion() {
        let response = LinktallyError::code_space_exhausted("x").error_response();
        assert_eq!(
            response.headers().get(RETRY_AFTER).unwrap().to_str().unwrap(),
            "1"
        );

        let response = LinktallyError::alias_in_use("x").error_response();
        assert!(response.headers().get(RETRY_AFTER).is_none());
    }

    #[test]
    fn test_client_errors_are_4xx() {
        let errors = [
            LinktallyError::invalid_url_format("x"),
            LinktallyError::alias_in_use("x"),
            LinktallyError::expired("x"),
            LinktallyError::code_space_exhausted("x"),
            LinktallyError::store_unavailable("x"),
            LinktallyError::serialization("x"),
        ];
        for err in errors {
            assert_eq!(
                err.status_code().is_client_error(),
                err.is_client_error(),
                "{:?}",
                err
            );
        }
    }

    #[actix_web::test]
    async fn test_server_error_body_hides_details() {
        let response = LinktallyError::store_unavailable("pool timed out on 10.0.0.5").error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Internal server error"), "{text}");
        assert!(!text.contains("10.0.0.5"), "{text}");

        let response = LinktallyError::not_found("Short URL 'abc' not found").error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("'abc'"));
    }
}
