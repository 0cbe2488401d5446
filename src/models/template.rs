//! Template domain models
//!
//! Normalized shapes for catalog data. The upstream API has shipped several
//! payload schemas over time; these types are what the rest of the relay
//! relies on once normalization has run.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Workflow Node ==
/// A single node inside a workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Display name of the node
    pub name: String,
    /// Node type identifier, e.g. `n8n-nodes-base.slack`
    #[serde(rename = "type")]
    pub node_type: String,
    /// Canvas position
    pub position: [f64; 2],
    /// Node configuration as the upstream stored it
    pub parameters: Value,
}

// == Author ==
/// Whoever published the template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

// == Template ==
/// One normalized workflow template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub nodes: Vec<WorkflowNode>,
    /// Full workflow definition, passed through untouched
    pub workflow: Value,
    pub created_at: String,
    pub updated_at: String,
    pub total_views: u64,
    pub official: bool,
    pub author: Author,
}

// == Search Result ==
/// One page of normalized search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub templates: Vec<Template>,
    pub total: u64,
    pub page: u32,
    pub pages: u64,
    pub limit: u32,
}

// == Category ==
/// A catalog category, possibly with nested subcategories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<Category>>,
}
