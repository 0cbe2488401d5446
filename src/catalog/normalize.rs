//! Normalization Module
//!
//! The upstream catalog has shipped several response schemas over its
//! lifetime; payloads arrive with rows under different keys, ids under
//! different names, and nodes at different depths. These functions accept
//! any of those shapes and produce the one set of types the rest of the
//! relay works with.

use serde_json::Value;

use crate::catalog::DEFAULT_ROWS;
use crate::models::requests::SearchParams;
use crate::models::template::{Author, Category, SearchResult, Template, WorkflowNode};

// == Search Results ==
/// Normalizes one page of search results, whatever shape it arrived in.
///
/// `params` supplies the page and limit the caller asked for; zero values
/// fall back to page 1 and the default row count.
pub fn normalize_search_result(data: &Value, params: &SearchParams) -> SearchResult {
    let rows = search_container(data);
    let templates: Vec<Template> = rows.iter().map(normalize_template).collect();

    let limit = if params.limit == 0 {
        DEFAULT_ROWS
    } else {
        params.limit
    };
    let total = u64_field(data, &["total", "count"]).unwrap_or(templates.len() as u64);
    // Page math reads `total` or the row count, never `count`.
    let total_for_pages = u64_field(data, &["total"]).unwrap_or(templates.len() as u64);

    SearchResult {
        templates,
        total,
        page: params.page.max(1),
        pages: total_for_pages.div_ceil(u64::from(limit)),
        limit,
    }
}

/// Rows may arrive under `templates`, `workflows`, `data`, or as the bare
/// array itself.
fn search_container(data: &Value) -> &[Value] {
    ["templates", "workflows", "data"]
        .iter()
        .find_map(|key| data.get(*key).and_then(Value::as_array))
        .or_else(|| data.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

// == Templates ==
/// Normalizes a single template payload.
pub fn normalize_template(data: &Value) -> Template {
    let now = chrono::Utc::now().to_rfc3339();

    Template {
        id: string_field(data, &["id", "_id", "workflowId"]).unwrap_or_default(),
        name: string_field(data, &["name", "title"])
            .unwrap_or_else(|| "Untitled Workflow".to_string()),
        description: string_field(data, &["description", "summary"]).unwrap_or_default(),
        category: string_field(data, &["category"])
            .or_else(|| category_at(data, 0))
            .unwrap_or_else(|| "Other".to_string()),
        subcategory: string_field(data, &["subcategory"]).or_else(|| category_at(data, 1)),
        tags: extract_tags(data),
        nodes: extract_nodes(data),
        workflow: data
            .get("workflow")
            .filter(|v| !v.is_null())
            .cloned()
            .unwrap_or_else(|| data.clone()),
        created_at: string_field(data, &["createdAt", "created_at"]).unwrap_or_else(|| now.clone()),
        updated_at: string_field(data, &["updatedAt", "updated_at"]).unwrap_or_else(|| now.clone()),
        total_views: u64_field(data, &["totalViews", "views"]).unwrap_or(0),
        official: bool_field(data, "official") || bool_field(data, "verified"),
        author: normalize_author(data),
    }
}

/// Author fields resolve independently: the name may come from `creator`
/// while the avatar comes from `author`.
fn normalize_author(data: &Value) -> Author {
    let author = data.get("author");
    let creator = data.get("creator");
    let pick = |field: &str| {
        author
            .and_then(|a| a.get(field))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .or_else(|| {
                creator
                    .and_then(|c| c.get(field))
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
            })
            .map(String::from)
    };

    Author {
        name: pick("name").unwrap_or_else(|| "Community".to_string()),
        avatar: pick("avatar"),
    }
}

/// Tag list from `tags`, falling back to `categories`; items may be bare
/// strings or objects carrying a name.
fn extract_tags(data: &Value) -> Vec<String> {
    let list = data
        .get("tags")
        .and_then(Value::as_array)
        .or_else(|| data.get("categories").and_then(Value::as_array));

    list.map(|items| {
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => string_field(item, &["name", "title"]),
                _ => None,
            })
            .collect()
    })
    .unwrap_or_default()
}

// == Nodes ==
/// Pulls the node list out of whichever container the payload uses.
///
/// Nodes live under `workflow.nodes` or under a top-level object's `nodes`
/// key; a bare top-level node array has no such key and reads as empty.
fn extract_nodes(data: &Value) -> Vec<WorkflowNode> {
    let container = data
        .get("workflow")
        .filter(|v| !v.is_null())
        .or_else(|| data.get("nodes").filter(|v| !v.is_null()))
        .unwrap_or(data);

    container
        .get("nodes")
        .and_then(Value::as_array)
        .map(|nodes| nodes.iter().map(normalize_node).collect())
        .unwrap_or_default()
}

fn normalize_node(raw: &Value) -> WorkflowNode {
    WorkflowNode {
        name: string_field(raw, &["name", "label"]).unwrap_or_else(|| "Unnamed Node".to_string()),
        node_type: string_field(raw, &["type", "typeVersion"])
            .unwrap_or_else(|| "unknown".to_string()),
        position: node_position(raw),
        parameters: ["parameters", "props", "settings"]
            .iter()
            .find_map(|key| raw.get(*key).filter(|v| !v.is_null()))
            .cloned()
            .unwrap_or(Value::Null),
    }
}

fn node_position(raw: &Value) -> [f64; 2] {
    match raw.get("position").and_then(Value::as_array) {
        Some(coords) => [
            coords.first().and_then(Value::as_f64).unwrap_or(0.0),
            coords.get(1).and_then(Value::as_f64).unwrap_or(0.0),
        ],
        None => [0.0, 0.0],
    }
}

// == Categories ==
/// Normalizes the category listing; rows may sit under `categories` or be
/// the payload itself.
pub fn normalize_categories(data: &Value) -> Vec<Category> {
    let rows = data
        .get("categories")
        .and_then(Value::as_array)
        .or_else(|| data.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    rows.iter().map(normalize_category).collect()
}

fn normalize_category(raw: &Value) -> Category {
    Category {
        name: category_name(raw),
        count: u64_field(raw, &["count", "total"]).unwrap_or(0),
        subcategories: raw
            .get("subcategories")
            .and_then(Value::as_array)
            .map(|subs| {
                subs.iter()
                    .map(|sub| Category {
                        name: category_name(sub),
                        count: u64_field(sub, &["count", "total"]).unwrap_or(0),
                        subcategories: None,
                    })
                    .collect()
            }),
    }
}

/// Category entries may be objects or bare values; bare values read as
/// their own name.
fn category_name(raw: &Value) -> String {
    string_field(raw, &["name", "title"]).unwrap_or_else(|| match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

// == Field Helpers ==
/// First of `keys` holding a non-empty string, stringifying numbers.
fn string_field(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match data.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// First of `keys` holding a non-zero number; zero and absent read the same.
fn u64_field(data: &Value, keys: &[&str]) -> Option<u64> {
    keys.iter()
        .find_map(|key| data.get(*key).and_then(Value::as_u64).filter(|n| *n != 0))
}

fn bool_field(data: &Value, key: &str) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Reads `categories[index]` as a name, accepting bare strings or objects.
fn category_at(data: &Value, index: usize) -> Option<String> {
    let item = data.get("categories")?.as_array()?.get(index)?;
    match item {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(_) => string_field(item, &["name", "title"]),
        _ => None,
    }
}
