pub mod action;
pub mod compare;
pub mod config;
pub mod env;
pub mod executor;
pub mod feedback;
pub mod sink;
pub mod style;
pub mod suite;
pub mod testing;

pub use crate::config::HarnessConfig;
