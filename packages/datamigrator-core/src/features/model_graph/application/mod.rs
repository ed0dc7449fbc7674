//! Application layer for the model graph feature

pub mod model_graph_usecase;

pub use model_graph_usecase::{ModelGraphUseCase, ModelGraphUseCaseImpl};
