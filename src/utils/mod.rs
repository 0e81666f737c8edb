//! Reusable utilities shared across the engine

pub mod jitter;
