pub mod llm;
pub mod credentials;
pub mod dispatch;
