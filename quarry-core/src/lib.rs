//! QUARRY Core - Filter Model & Query Composition
//!
//! Storage-agnostic building blocks for list endpoints:
//!
//! ```text
//! JSON filter / query params
//!     ↓
//! Filter + QueryPayload        (filter, payload)
//!     ↓
//! Pagination normalization     (pagination)
//!     ↓
//! apply_filter → QueryBuilder  (builder, implemented by adapters)
//!     ↓
//! total count → PaginationMeta (pagination)
//! ```
//!
//! Nothing here executes queries or knows a SQL dialect; engines plug in
//! through the [`QueryBuilder`] and [`FieldApplier`] traits.

pub mod adapter;
pub mod builder;
pub mod config;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod payload;
pub mod typed;

pub use adapter::{cast_if_semistructured, relation_path_to_camel, snake_to_camel};
pub use builder::{apply_filter, FieldApplier, QueryBuilder};
pub use config::{NestedParseMode, QueryConfig};
pub use error::{ConfigError, DecodeError, QueryError, QueryResult};
pub use filter::{FieldExpr, Filter, AND_KEY, NOT_KEY, OR_KEY};
pub use pagination::{build_meta, extract_count_payload, merge_where_with_and, normalize, ListPlan};
pub use payload::{ListResponse, Order, PaginationMeta, QueryPayload, SortDirection};
pub use typed::{Field, FilterBuilder};
