//! API Module
//!
//! HTTP handlers and routing for the relay's REST API.
//!
//! # Endpoints
//! - `GET /health` - Relay and upstream health report
//! - `GET /api/templates/search` - Search the catalog
//! - `GET /api/templates/:id` - Template detail with workflow JSON
//! - `GET /api/nodes/:node_type/templates` - Templates using a node type
//! - `GET /api/categories` - Category listing
//! - `POST /api/export` - Bundle templates for import
//! - `GET /api/cache/stats` - Cache statistics
//! - `POST /api/cache/clear` - Drop all cached entries

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
