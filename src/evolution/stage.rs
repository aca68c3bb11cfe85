use std::fmt;

/// Phase of one generation's processing.
///
/// The driver sets the stage once per phase; caches read it so that values
/// can be scoped to "this phase of this generation".
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EvolutionStage {
    #[default]
    Selection,
    Crossover,
    Mutation,
    Reinsertion,
}

impl fmt::Display for EvolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvolutionStage::Selection => "selection",
            EvolutionStage::Crossover => "crossover",
            EvolutionStage::Mutation => "mutation",
            EvolutionStage::Reinsertion => "reinsertion",
        };
        f.write_str(name)
    }
}
