pub mod analyze;
pub mod retrieve;
pub mod symbolic;
pub mod synthesize;
pub mod tree_eval;

pub use analyze::AnalyzeNode;
pub use retrieve::RetrieveNode;
pub use symbolic::SymbolicNode;
pub use synthesize::SynthesizeNode;
pub use tree_eval::TreeEvalNode;
