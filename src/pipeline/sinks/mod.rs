// src/pipeline/sinks/mod.rs

pub mod base_sink;
pub mod collect_sink;
pub mod console_sink;

pub use base_sink::RecordSink;
pub use collect_sink::CollectSink;
pub use console_sink::{ConsoleSink, OutputFormat};
