//! Statute-of-limitations breach detection

mod limits;
mod evaluator;

pub use limits::StateLimits;
pub use evaluator::{
    add_limitation_period,
    evaluate,
    SolClassification,
    SolEvaluator,
    SolRecord,
};
