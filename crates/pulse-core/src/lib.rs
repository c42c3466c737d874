//! Core types and derivation engine for Pulse.
//!
//! Turns three raw fact streams (locations, reviews, weekly KPI records) into
//! decision-support signals: health scores, alerts, trend deltas, rollups and
//! themed review feedback.
//!
//! This crate has no HTTP or database dependencies. Every
//! derived value is recomputed from an explicit [`store::Snapshot`]; nothing
//! is cached between calls.

// Trait methods spell out their `Send` futures explicitly.
#![allow(async_fn_in_trait)]

pub mod alert;
pub mod config;
pub mod engine;
pub mod entity;
pub mod error;
pub mod feedback;
pub mod health;
pub mod insight;
pub mod rollup;
pub mod store;
pub mod trend;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
