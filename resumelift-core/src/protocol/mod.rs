//! Protocol layer: typed requests and results exchanged with providers

pub mod types;

pub use types::{
    EnhancementRequest, EnhancementResult, Improvement, ImprovementKind, ReviewRequest,
    ReviewResult,
};
