pub mod routes;
pub mod startup;
pub mod state;
pub mod errors;
pub mod response;
pub mod extract;
pub mod openapi;

pub use startup::run;
