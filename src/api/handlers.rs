//! API Handlers
//!
//! HTTP request handlers for each relay endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::catalog::TemplateService;
use crate::error::{Result, ServiceError};
use crate::models::{
    Category, ClearCacheResponse, ExportRequest, ExportResponse, HealthResponse,
    NodeTemplatesResponse, SearchQuery, SearchResponse, StatsResponse, TemplateDetail,
};

/// Application state shared across all handlers.
///
/// Contains the catalog service wrapped in Arc for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Shared catalog service
    pub service: Arc<TemplateService>,
}

impl AppState {
    /// Creates a new AppState around the given service.
    pub fn new(service: TemplateService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(TemplateService::new(config))
    }
}

/// Handler for GET /api/templates/search
///
/// Searches the catalog and returns a compact listing.
pub async fn search_handler(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    // Validate request
    if let Some(error_msg) = query.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let params = query.into_params();
    let result = state.service.search_templates(&params).await?;

    Ok(Json(SearchResponse::from_result(&result)))
}

/// Handler for GET /api/templates/:id
///
/// Returns one template with its full workflow definition.
pub async fn template_handler(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<TemplateDetail>> {
    if template_id.trim().is_empty() {
        return Err(ServiceError::InvalidRequest(
            "template id must not be blank".to_string(),
        ));
    }

    let template = state.service.get_template(&template_id).await?;

    Ok(Json(TemplateDetail::from_template(&template)))
}

/// Handler for GET /api/nodes/:node_type/templates
///
/// Lists templates that use the given node type.
pub async fn node_templates_handler(
    State(state): State<AppState>,
    Path(node_type): Path<String>,
) -> Result<Json<NodeTemplatesResponse>> {
    if node_type.trim().is_empty() {
        return Err(ServiceError::InvalidRequest(
            "node type must not be blank".to_string(),
        ));
    }

    let templates = state.service.find_templates_by_node(&node_type).await?;

    Ok(Json(NodeTemplatesResponse::new(node_type, &templates)))
}

/// Handler for GET /api/categories
///
/// Returns the normalized category list.
pub async fn categories_handler(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.service.get_categories().await?;

    Ok(Json(categories))
}

/// Handler for POST /api/export
///
/// Bundles the requested templates into an importable document.
pub async fn export_handler(
    State(state): State<AppState>,
    Json(req): Json<ExportRequest>,
) -> Result<Json<ExportResponse>> {
    // Validate request
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let export = state.service.export_templates(&req.template_ids).await?;

    Ok(Json(export))
}

/// Handler for GET /api/cache/stats
///
/// Returns per-store cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.service.cache().stats().await;

    Json(StatsResponse::from(stats))
}

/// Handler for POST /api/cache/clear
///
/// Clears every cache store and reports before/after statistics.
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let cache = state.service.cache();
    let before = StatsResponse::from(cache.stats().await);
    cache.clear().await;
    let after = StatsResponse::from(cache.stats().await);

    Json(ClearCacheResponse::new(before, after))
}

/// Handler for GET /health
///
/// Probes the upstream once and reports relay health. Always 200; a broken
/// upstream shows up in the body, not the status.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let upstream_healthy = state.service.health_check().await;
    let cache = StatsResponse::from(state.service.cache().stats().await);

    Json(HealthResponse::new(upstream_healthy, cache))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio_test::assert_err;

    fn test_state() -> AppState {
        // Points at the default upstream; these tests never fetch.
        AppState::from_config(&Config::default())
    }

    fn query(page: u32, limit: u32) -> SearchQuery {
        SearchQuery {
            query: None,
            page,
            limit,
            category: None,
            subcategory: None,
            tags: None,
            nodes: None,
            official: None,
        }
    }

    #[tokio::test]
    async fn test_search_handler_rejects_bad_limit() {
        let result = search_handler(State(test_state()), Query(query(1, 0))).await;
        match result {
            Err(ServiceError::InvalidRequest(msg)) => {
                assert!(msg.contains("limit"));
            }
            other => panic!("expected invalid request, got {other:?}"),
        }

        let result = search_handler(State(test_state()), Query(query(1, 21))).await;
        tokio_test::assert_err!(result);
    }

    #[tokio::test]
    async fn test_search_handler_rejects_page_zero() {
        let result = search_handler(State(test_state()), Query(query(0, 10))).await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_template_handler_rejects_blank_id() {
        let result = template_handler(State(test_state()), Path("   ".to_string())).await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_node_templates_handler_rejects_blank_type() {
        let result = node_templates_handler(State(test_state()), Path("  ".to_string())).await;
        match result {
            Err(ServiceError::InvalidRequest(msg)) => {
                assert!(msg.contains("node type"));
            }
            other => panic!("expected invalid request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_export_handler_rejects_empty_ids() {
        let req = ExportRequest {
            template_ids: vec![],
        };
        let result = export_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(ServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler_reports_empty_stores() {
        let response = stats_handler(State(test_state())).await;
        assert_eq!(response.search.size, 0);
        assert_eq!(response.template.size, 0);
        assert_eq!(response.categories.size, 0);
    }

    #[tokio::test]
    async fn test_clear_cache_handler_reports_before_and_after() {
        let response = clear_cache_handler(State(test_state())).await;
        assert_eq!(response.message, "cache cleared");
        assert_eq!(response.before.search.size, 0);
        assert_eq!(response.after.search.size, 0);
    }
}
