//! Catalog Service Module
//!
//! Business operations over the upstream template catalog. Every read goes
//! through the tiered cache; every cache miss goes upstream through the
//! retrying fetcher and the payload is normalized before it is stored.

use std::sync::Arc;

use futures::future::try_join_all;
use reqwest::Url;
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{CacheKind, TieredCache};
use crate::catalog::normalize::{
    normalize_categories, normalize_search_result, normalize_template,
};
use crate::catalog::DEFAULT_ROWS;
use crate::config::Config;
use crate::error::ServiceError;
use crate::fetch::{FetchError, FetchOptions, Fetcher};
use crate::models::requests::SearchParams;
use crate::models::responses::ExportResponse;
use crate::models::template::{Category, SearchResult, Template};

// == Constants ==
/// Rows requested from the upstream when searching by node type
const NODE_SEARCH_ROWS: u32 = 50;

// == Template Service ==
/// The relay's one stop for catalog data.
///
/// # Fields
/// * `fetcher` - Retrying HTTP client for upstream trips
/// * `cache` - Tiered response cache shared with the cleanup task
/// * `api_base` - Base URL of the upstream catalog
/// * `max_retries` - Attempt budget handed to the fetcher
pub struct TemplateService {
    fetcher: Fetcher,
    cache: Arc<TieredCache>,
    api_base: Url,
    max_retries: u32,
}

impl TemplateService {
    /// Builds the service from the application configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_fetcher(config, Fetcher::new())
    }

    /// Builds the service around a specific fetcher.
    pub fn with_fetcher(config: &Config, fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            cache: Arc::new(TieredCache::new(&config.cache)),
            api_base: config.api_base.clone(),
            max_retries: config.max_retries,
        }
    }

    /// Shared handle to the cache, for stats, clearing, and expiry sweeps.
    pub fn cache(&self) -> Arc<TieredCache> {
        Arc::clone(&self.cache)
    }

    // == Catalog Operations ==
    /// Searches the catalog, serving repeated queries from the cache.
    pub async fn search_templates(
        &self,
        params: &SearchParams,
    ) -> Result<SearchResult, ServiceError> {
        let cache_key = params.cache_key();
        let result = self
            .cache
            .get_or_compute(CacheKind::Search, &cache_key, || async {
                let url = search_url(&self.api_base, params);
                info!(%url, "searching upstream catalog");
                let data = self.fetch_json(&url).await?;
                Ok::<_, FetchError>(normalize_search_result(&data, params))
            })
            .await?;

        Ok(result)
    }

    /// Fetches one template with its full workflow definition.
    pub async fn get_template(&self, template_id: &str) -> Result<Template, ServiceError> {
        let template = self
            .cache
            .get_or_compute(CacheKind::Template, template_id, || async {
                let url = endpoint_url(&self.api_base, &["templates", "workflows", template_id]);
                info!(%url, "fetching template from upstream");
                let data = self.fetch_json(&url).await?;
                Ok::<_, FetchError>(normalize_template(&data))
            })
            .await?;

        Ok(template)
    }

    /// Lists the catalog's categories.
    pub async fn get_categories(&self) -> Result<Vec<Category>, ServiceError> {
        let categories = self
            .cache
            .get_or_compute(CacheKind::Categories, "all", || async {
                let url = endpoint_url(&self.api_base, &["templates", "categories"]);
                info!(%url, "fetching categories from upstream");
                let data = self.fetch_json(&url).await?;
                Ok::<_, FetchError>(normalize_categories(&data))
            })
            .await?;

        Ok(categories)
    }

    /// Finds templates that use a given node type.
    pub async fn find_templates_by_node(
        &self,
        node_type: &str,
    ) -> Result<Vec<Template>, ServiceError> {
        let cache_key = format!("node:{node_type}");
        let fetch_params = SearchParams {
            nodes: vec![node_type.to_string()],
            page: 1,
            limit: NODE_SEARCH_ROWS,
            ..SearchParams::default()
        };

        let templates = self
            .cache
            .get_or_compute(CacheKind::Search, &cache_key, || async {
                let url = search_url(&self.api_base, &fetch_params);
                info!(%url, node_type, "searching upstream catalog by node");
                let data = self.fetch_json(&url).await?;
                let result = normalize_search_result(&data, &SearchParams::default());
                Ok::<_, FetchError>(result.templates)
            })
            .await?;

        Ok(templates)
    }

    /// Fetches every requested template and packages them as an importable
    /// workflow bundle.
    pub async fn export_templates(
        &self,
        template_ids: &[String],
    ) -> Result<ExportResponse, ServiceError> {
        let fetches = template_ids.iter().map(|id| self.get_template(id));
        let templates = try_join_all(fetches).await?;

        Ok(ExportResponse::from_templates(&templates))
    }

    /// Probes the upstream with a single attempt.
    ///
    /// # Returns
    /// * `bool` - Whether the upstream answered with a success status
    pub async fn health_check(&self) -> bool {
        let url = endpoint_url(&self.api_base, &["health"]);
        match self
            .fetcher
            .fetch_with_retry(url.as_str(), FetchOptions::default(), 1)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "upstream health probe failed");
                false
            }
        }
    }

    // == Upstream Plumbing ==
    async fn fetch_json(&self, url: &Url) -> Result<Value, FetchError> {
        let response = self
            .fetcher
            .fetch_with_retry(url.as_str(), FetchOptions::default(), self.max_retries)
            .await?;

        response.parse_json()
    }
}

// == URL Building ==
/// Appends path segments to the configured base, keeping any path prefix
/// the base already carries and percent-encoding each segment.
fn endpoint_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .expect("api base is always a valid http(s) url");
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    url
}

/// Builds the upstream search URL.
///
/// Tags repeat as one `tags` pair per value; node types join into a single
/// comma-separated `nodes` pair.
fn search_url(base: &Url, params: &SearchParams) -> Url {
    let mut url = endpoint_url(base, &["templates", "search"]);
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("page", &params.page.max(1).to_string());
        let rows = if params.limit == 0 {
            DEFAULT_ROWS
        } else {
            params.limit
        };
        query.append_pair("rows", &rows.to_string());
        if let Some(search) = &params.query {
            query.append_pair("search", search);
        }
        if let Some(category) = &params.category {
            query.append_pair("category", category);
        }
        if let Some(subcategory) = &params.subcategory {
            query.append_pair("subcategory", subcategory);
        }
        for tag in &params.tags {
            query.append_pair("tags", tag);
        }
        if !params.nodes.is_empty() {
            query.append_pair("nodes", &params.nodes.join(","));
        }
        if let Some(official) = params.official {
            query.append_pair("official", if official { "true" } else { "false" });
        }
    }
    url
}
