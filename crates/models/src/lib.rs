//! SeaORM entities for the catalog plus model-level validation.

pub mod errors;
pub mod db;
pub mod category;
pub mod product;

#[cfg(test)]
mod tests;
