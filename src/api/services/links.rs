use actix_web::{HttpResponse, web};
use tracing::trace;

use crate::api::AppState;
use crate::api::types::{
    ApiResponse, ListUrlsQuery, PaginationInfo, ShortenData, ShortenRequest, StatsData, UrlItem,
    UrlsData,
};
use crate::errors::LinktallyError;
use crate::services::CreateLinkRequest;
use crate::storage::{ListQuery, SortField, SortOrder};

/// `/api/*` 下的链接管理接口
pub struct LinkApiService;

impl LinkApiService {
    pub async fn shorten(
        state: web::Data<AppState>,
        body: web::Json<ShortenRequest>,
    ) -> Result<HttpResponse, LinktallyError> {
        let body = body.into_inner();
        let link = state
            .links
            .create_link(CreateLinkRequest {
                original_url: body.url,
                custom_alias: body.custom_alias,
                ttl_seconds: body.expires_in,
            })
            .await?;

        Ok(HttpResponse::Created()
            .json(ApiResponse::ok(ShortenData::from_link(&link, &state.base_url))))
    }

    pub async fn list_urls(
        state: web::Data<AppState>,
        query: web::Query<ListUrlsQuery>,
    ) -> Result<HttpResponse, LinktallyError> {
        let query = Self::parse_list_query(query.into_inner())?;
        trace!("Listing links: {:?}", query);

        let page = state.links.list_links(&query).await?;
        let urls = page
            .links
            .iter()
            .map(|link| UrlItem::from_summary(link, &state.base_url))
            .collect();

        Ok(HttpResponse::Ok().json(ApiResponse::ok(UrlsData {
            urls,
            pagination: PaginationInfo {
                current_page: query.page,
                total_pages: page.total_pages(query.page_size),
                total_urls: page.total,
                per_page: query.page_size,
            },
        })))
    }

    pub async fn stats(
        state: web::Data<AppState>,
        path: web::Path<String>,
    ) -> Result<HttpResponse, LinktallyError> {
        let code = path.into_inner();
        let stats = state.analytics.link_analytics(&code).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::ok(StatsData::from(stats))))
    }

    fn parse_list_query(raw: ListUrlsQuery) -> Result<ListQuery, LinktallyError> {
        let sort_field = match raw.sort_by.as_deref() {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => SortField::default(),
        };
        let sort_order = match raw.order.as_deref() {
            Some(s) if !s.is_empty() => s.parse()?,
            _ => SortOrder::default(),
        };
        Ok(ListQuery::new(
            raw.page.unwrap_or(1),
            raw.limit.unwrap_or(10),
            sort_field,
            sort_order,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_query_defaults() {
        let query = LinkApiService::parse_list_query(ListUrlsQuery::default()).unwrap();
        assert_eq!(query, ListQuery::default());
    }

    #[test]
    fn test_parse_list_query_rejects_unknown_sort() {
        let raw = ListUrlsQuery {
            sort_by: Some("clicks; DROP TABLE".to_string()),
            ..Default::default()
        };
        let err = LinkApiService::parse_list_query(raw).unwrap_err();
        assert!(matches!(err, LinktallyError::Validation(_)));
    }

    #[test]
    fn test_parse_list_query_clamps_limit() {
        let raw = ListUrlsQuery {
            page: Some(0),
            limit: Some(5000),
            sort_by: Some("totalClicks".to_string()),
            order: Some("asc".to_string()),
        };
        let query = LinkApiService::parse_list_query(raw).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, ListQuery::MAX_PAGE_SIZE);
        assert_eq!(query.sort_field, SortField::TotalClicks);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }
}
