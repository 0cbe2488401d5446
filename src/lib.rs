//! Template Relay - A resilient caching relay for a workflow template catalog
//!
//! Serves normalized template, category, and export data over REST, backed
//! by a tiered TTL cache and a retrying upstream fetcher.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use catalog::TemplateService;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
