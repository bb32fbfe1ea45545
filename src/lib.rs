pub mod capability;
pub mod config;
pub mod context;
pub mod intent;
pub mod planner;
pub mod services;
pub mod session;
pub mod telemetry;

pub use config::Config;
pub use context::ContextStore;
pub use intent::{Classification, IntentClassifier, IntentResult};
pub use planner::{Planner, PlannerDecision};
pub use session::{Session, Turn};
