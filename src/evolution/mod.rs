pub mod algorithm;
pub mod dispatch;
pub mod options;
pub mod stage;

pub use algorithm::GeneticAlgorithm;
pub use dispatch::GenerationDispatcher;
pub use options::{DispatchOptions, DispatchOptionsBuilder};
pub use stage::EvolutionStage;
