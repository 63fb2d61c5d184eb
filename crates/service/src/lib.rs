//! Service layer for the catalog: business rules on top of `models`.
//! - Category and product services behind repository traits.
//! - Media store abstraction and the background cleanup queue.
//! - Pagination helpers and a single `ServiceError` type.

pub mod errors;
pub mod pagination;
pub mod media;
pub mod cleanup;
pub mod category;
pub mod product;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
