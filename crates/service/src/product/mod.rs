//! Product module: domain, repository and service layers.
//!
//! The service owns the image workflow: uploads go through a
//! [`MediaStore`](crate::media::MediaStore) before any row is written, and
//! files a product stops referencing are handed to the
//! [`CleanupQueue`](crate::cleanup::CleanupQueue).

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use service::ProductService;
