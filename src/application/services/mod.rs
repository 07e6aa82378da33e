pub mod selection_resolver;
pub mod similarity;

pub use selection_resolver::{FixedPrompt, Selection, SelectionPrompt, SelectionResolver};
pub use similarity::{SimilarityScorer, WeightedRatio};
