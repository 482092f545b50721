pub mod compute;
pub mod reasoning;
pub mod roles;
pub mod symbolize;
pub mod unify;

pub use reasoning::{SymbolicOutcome, SymbolicReasoner};
