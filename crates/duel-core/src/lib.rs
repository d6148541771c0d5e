pub mod difficulty;
pub mod eval;
pub mod model;
