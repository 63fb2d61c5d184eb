pub use models::category::Model as Category;

/// Partial category update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
}
