pub mod seaorm;

pub use seaorm::SeaOrmProductRepository;
