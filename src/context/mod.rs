//! Short-term conversational memory.
//!
//! One [`ContextStore`] per session. It is passed explicitly into the
//! classifier and planner; there is no process-wide instance.

pub mod types;
pub mod store;
pub mod resolver;

pub use types::*;
pub use store::*;
