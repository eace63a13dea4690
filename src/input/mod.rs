mod normalize;
mod reader;

pub use normalize::{CaseMode, NormalizedInput, Normalizer};
pub use reader::{LineReader, ReadOutcome};
