pub mod api_types;
pub mod cancellation;
pub mod chunk;
pub mod config;
pub mod error;
pub mod llm;
pub mod state;
pub mod symbolic;
pub mod threshold;
pub mod tree_types;
pub mod vectorstore;

pub use api_types::{ClientValuesInput, EligibilityOptions, EligibilityResult, QueryOptions, QueryResult};
pub use cancellation::CancellationToken;
pub use chunk::Chunk;
pub use config::{EngineConfig, ToleranceDefaults};
pub use error::{CounselError, Result};
pub use llm::{LlmClient, LlmFactory, LlmTurn, Message, ToolInvocation, ToolSpec};
pub use state::{AgentState, ClientValues, Complexity, ReasoningStep, ToolCallRecord};
pub use symbolic::{ComparisonOp, SymbolicComparison, SymbolicVariable, Unit};
pub use threshold::{format_gbp, normalize_threshold_name, ThresholdCache, ThresholdEntry};
pub use tree_types::{
    CriterionResult, CriterionStatus, Likelihood, NearMiss, Operator, Priority, Recommendation,
    Strategy, TreeResult, Verdict,
};
pub use vectorstore::VectorStore;
