use std::path::PathBuf;
use std::sync::Arc;

use configs::MediaConfig;
use service::{
    category::{repository::CategoryRepository, CategoryService},
    cleanup::CleanupQueue,
    media::MediaStore,
    product::{repository::ProductRepository, ProductService},
};

use crate::errors::ErrorRendering;

/// Where multipart uploads are staged and how large they may be.
#[derive(Clone, Debug)]
pub struct UploadSettings {
    pub temp_dir: PathBuf,
    pub max_bytes: usize,
}

impl UploadSettings {
    pub fn from_config(cfg: &MediaConfig) -> Self {
        Self { temp_dir: PathBuf::from(&cfg.temp_dir), max_bytes: cfg.max_upload_bytes }
    }
}

#[derive(Clone)]
pub struct ServerState {
    pub categories: Arc<CategoryService>,
    pub products: Arc<ProductService>,
    pub uploads: UploadSettings,
    pub errors: ErrorRendering,
}

impl ServerState {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        products: Arc<dyn ProductRepository>,
        media: Arc<dyn MediaStore>,
        cleanup: CleanupQueue,
        uploads: UploadSettings,
    ) -> Self {
        Self {
            categories: Arc::new(CategoryService::new(categories.clone())),
            products: Arc::new(ProductService::new(products, categories, media, cleanup)),
            uploads,
            errors: ErrorRendering::default(),
        }
    }

    pub fn with_error_rendering(mut self, errors: ErrorRendering) -> Self {
        self.errors = errors;
        self
    }
}
