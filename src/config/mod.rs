// src/config/mod.rs

pub mod cli;
pub mod pipeline;

pub use cli::Args;
pub use pipeline::{load_pipeline_config, PipelineConfig, StageConfig};
