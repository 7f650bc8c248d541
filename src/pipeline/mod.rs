// src/pipeline/mod.rs

pub mod filters;
pub mod sinks;
pub mod sources;
