pub mod types;
pub mod risk;
pub mod tables;
pub mod decision;

pub use types::*;
pub use decision::Planner;
