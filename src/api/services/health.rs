use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use tracing::trace;

use crate::api::AppState;

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Seconds since the server started
    pub uptime: f64,
    pub storage: String,
    pub cache: &'static str,
}

/// 存活探针和 API 索引，不经过业务服务
pub struct HealthService;

impl HealthService {
    pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
        trace!("Received health check request");
        HttpResponse::Ok().json(HealthResponse {
            status: "healthy",
            timestamp: chrono::Utc::now(),
            uptime: state.started_at.elapsed().as_secs_f64(),
            storage: state.store.backend_name().to_string(),
            cache: state.cache.name(),
        })
    }

    pub async fn api_index() -> impl Responder {
        HttpResponse::Ok().json(json!({
            "message": "linktally URL shortener API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "shorten": "POST /api/shorten - Create a shortened URL",
                "stats": "GET /api/stats/{code} - Get analytics for a URL",
                "urls": "GET /api/urls - Get all URLs (paginated)",
                "redirect": "GET /{code} - Redirect to original URL",
            },
        }))
    }
}
