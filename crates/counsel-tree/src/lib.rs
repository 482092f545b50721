pub mod builder;
pub mod eval;
pub mod registry;
pub mod tree_def;

pub use builder::{build_all_trees, build_bankruptcy_tree, build_dro_tree, build_iva_tree};
pub use eval::evaluate;
pub use registry::TreeRegistry;
pub use tree_def::{ConditionNode, TreeNode};
