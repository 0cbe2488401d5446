//! Response DTOs for the relay API
//!
//! Defines the structure of outgoing HTTP response bodies. Everything here
//! is a trimmed projection of the normalized domain types; full workflow
//! payloads only travel on the detail and export endpoints.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{json, Value};

use crate::cache::{CacheStats, StoreStats};
use crate::models::template::{Author, SearchResult, Template};

/// Longest description carried by a search result row
const SUMMARY_DESCRIPTION_CHARS: usize = 200;

/// Longest description carried by a node match row
const MATCH_DESCRIPTION_CHARS: usize = 150;

/// Most template rows a search response will carry
const SEARCH_ROWS: usize = 10;

/// Most template rows a by-node response will carry
const NODE_MATCH_ROWS: usize = 8;

/// Shortens `text` to at most `max_chars` characters, marking the cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let mut shortened: String = text.chars().take(max_chars).collect();
        shortened.push_str("...");
        shortened
    } else {
        text.to_string()
    }
}

// == Template Summary ==
/// One row in a search result page.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub node_count: usize,
    /// First few node types, enough to tell what the workflow touches
    pub main_nodes: Vec<String>,
    pub official: bool,
    pub author: String,
    pub total_views: u64,
}

impl TemplateSummary {
    pub fn from_template(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: truncate(&template.description, SUMMARY_DESCRIPTION_CHARS),
            category: template.category.clone(),
            subcategory: template.subcategory.clone(),
            tags: template.tags.iter().take(5).cloned().collect(),
            node_count: template.nodes.len(),
            main_nodes: template
                .nodes
                .iter()
                .take(3)
                .map(|n| n.node_type.clone())
                .collect(),
            official: template.official,
            author: template.author.name.clone(),
            total_views: template.total_views,
        }
    }
}

// == Search Response ==
/// Response body for the search endpoint (GET /api/templates/search)
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub templates: Vec<TemplateSummary>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
    pub limit: u32,
}

impl SearchResponse {
    /// Projects a normalized result page. Pages stay summary-sized: at most
    /// ten rows come back no matter what limit the caller asked for.
    pub fn from_result(result: &SearchResult) -> Self {
        Self {
            templates: result
                .templates
                .iter()
                .take(SEARCH_ROWS)
                .map(TemplateSummary::from_template)
                .collect(),
            total: result.total,
            page: result.page,
            pages: result.pages,
            limit: result.limit,
        }
    }
}

// == Template Detail ==
/// A node as shown on the detail endpoint; parameters collapse to a flag.
#[derive(Debug, Clone, Serialize)]
pub struct NodeSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: [f64; 2],
    pub has_parameters: bool,
}

/// Response body for the detail endpoint (GET /api/templates/:id)
#[derive(Debug, Clone, Serialize)]
pub struct TemplateDetail {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub nodes: Vec<NodeSummary>,
    /// Full workflow definition, importable as-is
    pub workflow: Value,
    pub created_at: String,
    pub updated_at: String,
    pub total_views: u64,
    pub official: bool,
    pub author: Author,
}

impl TemplateDetail {
    pub fn from_template(template: &Template) -> Self {
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: template.description.clone(),
            category: template.category.clone(),
            subcategory: template.subcategory.clone(),
            tags: template.tags.clone(),
            nodes: template
                .nodes
                .iter()
                .map(|n| NodeSummary {
                    name: n.name.clone(),
                    node_type: n.node_type.clone(),
                    position: n.position,
                    has_parameters: n
                        .parameters
                        .as_object()
                        .map(|params| !params.is_empty())
                        .unwrap_or(false),
                })
                .collect(),
            workflow: template.workflow.clone(),
            created_at: template.created_at.clone(),
            updated_at: template.updated_at.clone(),
            total_views: template.total_views,
            official: template.official,
            author: template.author.clone(),
        }
    }
}

// == Node Match ==
/// One row in a by-node lookup, focused on how the target node is used.
#[derive(Debug, Clone, Serialize)]
pub struct NodeMatchSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub node_count: usize,
    /// How many nodes in the workflow match the requested type
    pub target_node_usage: usize,
    /// A few of the other node types the workflow combines with the target
    pub other_nodes: Vec<String>,
    pub official: bool,
    pub author: String,
    pub total_views: u64,
}

impl NodeMatchSummary {
    pub fn from_template(template: &Template, target: &str) -> Self {
        let needle = target.to_lowercase();
        let matches = |node_type: &str| node_type.to_lowercase().contains(&needle);

        let target_node_usage = template
            .nodes
            .iter()
            .filter(|n| matches(&n.node_type))
            .count();

        let other_nodes: Vec<String> = template
            .nodes
            .iter()
            .filter(|n| !matches(&n.node_type))
            .take(3)
            .map(|n| n.node_type.clone())
            .collect();

        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            description: truncate(&template.description, MATCH_DESCRIPTION_CHARS),
            category: template.category.clone(),
            tags: template.tags.iter().take(3).cloned().collect(),
            node_count: template.nodes.len(),
            target_node_usage,
            other_nodes,
            official: template.official,
            author: template.author.name.clone(),
            total_views: template.total_views,
        }
    }
}

/// Response body for the by-node endpoint (GET /api/nodes/:node_type/templates)
#[derive(Debug, Clone, Serialize)]
pub struct NodeTemplatesResponse {
    pub node_type: String,
    pub count: usize,
    pub templates: Vec<NodeMatchSummary>,
}

impl NodeTemplatesResponse {
    /// Projects up to eight matching templates for one node type.
    pub fn new(node_type: impl Into<String>, templates: &[Template]) -> Self {
        let node_type = node_type.into();
        let summaries: Vec<NodeMatchSummary> = templates
            .iter()
            .take(NODE_MATCH_ROWS)
            .map(|t| NodeMatchSummary::from_template(t, &node_type))
            .collect();
        Self {
            count: summaries.len(),
            node_type,
            templates: summaries,
        }
    }
}

// == Export ==
/// Bundle metadata attached to every export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportMetadata {
    pub template_count: usize,
    /// Every node type the bundle needs, in first-seen order
    pub node_types: Vec<String>,
}

/// Response body for the export endpoint (POST /api/export)
#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub version: String,
    pub exported_at: String,
    pub workflows: Vec<Value>,
    pub metadata: ExportMetadata,
}

impl ExportResponse {
    /// Bundles templates into an import-ready set of workflows.
    pub fn from_templates(templates: &[Template]) -> Self {
        Self {
            version: "1.0".to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            workflows: templates.iter().map(exported_workflow).collect(),
            metadata: ExportMetadata {
                template_count: templates.len(),
                node_types: unique_node_types(templates),
            },
        }
    }
}

/// A template's workflow with import naming and provenance stamped on.
fn exported_workflow(template: &Template) -> Value {
    let mut workflow = match &template.workflow {
        Value::Object(map) => map.clone(),
        _ => serde_json::Map::new(),
    };
    workflow.insert(
        "name".to_string(),
        json!(format!("{} (imported from n8n community)", template.name)),
    );
    workflow.insert("tags".to_string(), json!(template.tags));
    workflow.insert(
        "meta".to_string(),
        json!({
            "template_id": template.id,
            "original_name": template.name,
            "category": template.category,
            "author": template.author,
            "imported_at": chrono::Utc::now().to_rfc3339(),
        }),
    );
    Value::Object(workflow)
}

fn unique_node_types(templates: &[Template]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut types = Vec::new();
    for template in templates {
        for node in &template.nodes {
            if seen.insert(node.node_type.clone()) {
                types.push(node.node_type.clone());
            }
        }
    }
    types
}

// == Cache Stats ==
/// One store's counters plus its derived hit rate.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

impl From<StoreStats> for StoreSnapshot {
    fn from(stats: StoreStats) -> Self {
        Self {
            size: stats.size,
            max_size: stats.max_size,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for the stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub search: StoreSnapshot,
    pub template: StoreSnapshot,
    pub categories: StoreSnapshot,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            search: stats.search.into(),
            template: stats.template.into(),
            categories: stats.categories.into(),
        }
    }
}

/// Response body for the clear endpoint (POST /api/cache/clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub message: String,
    pub before: StatsResponse,
    pub after: StatsResponse,
}

impl ClearCacheResponse {
    pub fn new(before: StatsResponse, after: StatsResponse) -> Self {
        Self {
            message: "cache cleared".to_string(),
            before,
            after,
        }
    }
}

// == Health ==
/// Upstream reachability as seen by the probe.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamHealth {
    /// "healthy" when the upstream answered, "error" otherwise
    pub status: String,
    pub timestamp: String,
}

/// The relay's own liveness block.
#[derive(Debug, Clone, Serialize)]
pub struct ServerHealth {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub api: UpstreamHealth,
    pub cache: StatsResponse,
    pub server: ServerHealth,
}

impl HealthResponse {
    pub fn new(upstream_healthy: bool, cache: StatsResponse) -> Self {
        let timestamp = chrono::Utc::now().to_rfc3339();
        Self {
            api: UpstreamHealth {
                status: if upstream_healthy { "healthy" } else { "error" }.to_string(),
                timestamp: timestamp.clone(),
            },
            cache,
            server: ServerHealth {
                status: "ok".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                timestamp,
            },
        }
    }
}

// == Error ==
/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
