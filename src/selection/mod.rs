pub mod roulette;
pub mod selection_strategy;

pub use roulette::RouletteWheel;
pub use selection_strategy::Selection;
