//! Back ends. Each takes a validated machine and returns text.
pub mod config;
pub mod json;
pub mod xstate;
