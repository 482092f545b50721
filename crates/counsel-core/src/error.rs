use thiserror::Error;

/// The error taxonomy for the reasoning engine (spec §7).
///
/// Recoverable variants (`Analysis`, `Retrieval`, `Tool`, `ThresholdMiss`)
/// are handled locally by the node that raised them and never escape to a
/// caller. `Llm`, `TreeBuild`, `Cancelled` and `BudgetExceeded` are
/// unrecoverable: the graph stops and a well-formed result with an `error`
/// field populated is returned instead of propagating the error further.
#[derive(Error, Debug)]
pub enum CounselError {
    #[error("analysis error: {0}")]
    Analysis(String),

    #[error("retrieval error: {0}")]
    Retrieval(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("tool error ({tool}): {message}")]
    Tool { tool: String, message: String },

    #[error("threshold '{0}' not in cache")]
    ThresholdMiss(String),

    #[error("tree build error: {0}")]
    TreeBuild(String),

    #[error("query cancelled")]
    Cancelled,

    #[error("budget exceeded: {0}")]
    BudgetExceeded(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CounselError>;
