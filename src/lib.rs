//! Session orchestration for playing checkers against an engine that lives
//! behind an asynchronous worker boundary.

pub mod config;
pub mod session;
pub mod ui;

pub use config::SessionConfig;
pub use session::{InteractionState, Outcome, Session};
