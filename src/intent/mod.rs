pub mod types;
pub mod normalize;
pub mod patterns;
pub mod entities;
pub mod remote;
pub mod classifier;

pub use types::*;
pub use classifier::*;
