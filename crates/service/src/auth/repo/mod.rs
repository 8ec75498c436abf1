pub mod seaorm;

pub use seaorm::SeaOrmAuthRepository;
