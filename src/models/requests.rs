//! Request DTOs for the relay API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::{Deserialize, Serialize};

/// Largest page size a caller may request
const MAX_LIMIT: u32 = 20;

// == Search Query ==
/// Query string for the search endpoint (GET /api/templates/search)
///
/// # Fields
/// - `query`: Free-text search terms
/// - `page`: 1-based page number
/// - `limit`: Results per page, capped at 20
/// - `tags` / `nodes`: Comma-separated filter lists
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    /// Free-text search terms
    pub query: Option<String>,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Results per page
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Category filter
    pub category: Option<String>,
    /// Subcategory filter
    pub subcategory: Option<String>,
    /// Comma-separated tag filters
    pub tags: Option<String>,
    /// Comma-separated node type filters
    pub nodes: Option<String>,
    /// Restrict to officially published templates
    pub official: Option<bool>,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl SearchQuery {
    /// Validates the query parameters
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.page < 1 {
            return Some("page must be at least 1".to_string());
        }
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Some(format!("limit must be between 1 and {}", MAX_LIMIT));
        }
        None
    }

    /// Converts the raw query string into normalized search parameters.
    pub fn into_params(self) -> SearchParams {
        SearchParams {
            query: self.query.filter(|q| !q.trim().is_empty()),
            page: self.page,
            limit: self.limit,
            category: self.category,
            subcategory: self.subcategory,
            tags: split_csv(self.tags),
            nodes: split_csv(self.nodes),
            official: self.official,
        }
    }
}

fn split_csv(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

// == Search Params ==
/// Normalized search parameters, also the cache identity of a search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official: Option<bool>,
}

impl SearchParams {
    /// Stable cache key for this parameter set. Serialization follows field
    /// declaration order, so equal parameters always produce equal keys.
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).expect("search params always serialize")
    }
}

// == Export Request ==
/// Request body for the export endpoint (POST /api/export)
#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    /// Templates to bundle, by id
    pub template_ids: Vec<String>,
}

impl ExportRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.template_ids.is_empty() {
            return Some("template_ids cannot be empty".to_string());
        }
        if self.template_ids.iter().any(|id| id.trim().is_empty()) {
            return Some("template_ids cannot contain blank ids".to_string());
        }
        None
    }
}
