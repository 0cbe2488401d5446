//! Request and Response models for the relay API
//!
//! This module defines the normalized template domain types plus the DTOs
//! (Data Transfer Objects) used for serializing/deserializing HTTP request
//! and response bodies.

pub mod requests;
pub mod responses;
pub mod template;

// Re-export commonly used types
pub use requests::{ExportRequest, SearchParams, SearchQuery};
pub use responses::{
    ClearCacheResponse, ErrorResponse, ExportResponse, HealthResponse, NodeTemplatesResponse,
    SearchResponse, StatsResponse, TemplateDetail, TemplateSummary,
};
pub use template::{Author, Category, SearchResult, Template, WorkflowNode};
