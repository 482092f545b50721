pub mod engine;

pub use engine::CounselEngine;
