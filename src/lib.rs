// Declare the modules that form the library's public API (or internal structure)
// Using `pub mod` makes them accessible from the binary via `use siftline::module_name;`
pub mod cancellation;
pub mod config;
pub mod data_model;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod runner;
pub mod utils;

// Re-export the common types so callers can use the crate without digging
// through the module tree.
pub use cancellation::CancellationToken;
pub use data_model::{Experience, Person};
pub use error::{PipelineError, Result};
pub use executor::{FilterStage, Pipeline, RunSummary, StageStats};
