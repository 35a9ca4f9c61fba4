//! HTTP surface
//!
//! Thin actix-web handlers over the service layer. All state arrives through
//! `web::Data<AppState>`.

pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
pub mod types;

use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};

pub use state::AppState;
pub use types::{ApiResponse, ErrorResponse};

use services::{HealthService, LinkApiService, RedirectService};

/// Largest accepted JSON body
const JSON_LIMIT: usize = 16 * 1024;

/// Register every route; `/{code}` goes last so it never shadows the API
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(HealthService::health_check))
        .service(api_routes())
        .route("/{code}", web::get().to(RedirectService::handle_redirect));
}

/// `/api` 路由
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("", web::get().to(HealthService::api_index))
        .route("/shorten", web::post().to(LinkApiService::shorten))
        .route("/urls", web::get().to(LinkApiService::list_urls))
        .route("/stats/{code}", web::get().to(LinkApiService::stats))
}

/// Malformed bodies get the same envelope as every other error
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_LIMIT)
        .error_handler(|err, _req| {
            let body = ErrorResponse::new(format!("Invalid request body: {}", err));
            InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
        })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::new(format!("Invalid query string: {}", err));
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}
