// src/pipeline/sources/mod.rs

pub mod base_source;
pub mod roster_source;
pub mod yaml_source;

pub use base_source::RecordSource;
pub use roster_source::RosterSource;
pub use yaml_source::YamlRosterSource;
