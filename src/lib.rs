//! Price agent: a minimal tool-calling loop over a hosted model.
//!
//! The model may request local tools (price lookups, a horoscope stub, a
//! safe calculator); results are fed back and a final answer is synthesized.

pub mod agent;
pub mod config;
pub mod provider;
pub mod tools;
pub mod types;
