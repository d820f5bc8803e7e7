//! Shared types.

mod pagination;

pub use pagination::{Paginated, PaginationParams};
