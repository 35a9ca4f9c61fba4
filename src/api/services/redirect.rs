use actix_web::http::StatusCode;
use actix_web::http::header::LOCATION;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::trace;

use crate::analytics::Visit;
use crate::api::AppState;
use crate::errors::LinktallyError;
use crate::utils::ip::extract_client_ip;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        state: web::Data<AppState>,
    ) -> Result<HttpResponse, LinktallyError> {
        let code = path.into_inner();
        let visit = Self::visit_from_request(&req, &state.trusted_proxies);

        let resolved = state.resolver.resolve(&code, visit).await?;
        trace!("Redirecting {} -> {}", code, resolved.original_url);

        let status = if state.permanent_redirect {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::TEMPORARY_REDIRECT
        };
        Ok(HttpResponse::build(status)
            .insert_header((LOCATION, resolved.original_url))
            .finish())
    }

    /// 同步阶段只提取原始字符串，地理位置在后台解析
    fn visit_from_request(req: &HttpRequest, trusted_proxies: &[String]) -> Visit {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(String::from)
        };

        Visit {
            ip_address: extract_client_ip(req, trusted_proxies),
            user_agent: header("user-agent"),
            referer: header("referer").or_else(|| header("referrer")),
        }
    }
}
