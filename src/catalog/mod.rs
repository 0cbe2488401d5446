//! Catalog Module
//!
//! Normalization of upstream payloads and the service that ties fetching,
//! caching, and normalization together.

pub mod normalize;
pub mod service;

pub use normalize::{normalize_categories, normalize_search_result, normalize_template};
pub use service::TemplateService;

// == Public Constants ==
/// Page size assumed when a caller does not pick one
pub const DEFAULT_ROWS: u32 = 24;
