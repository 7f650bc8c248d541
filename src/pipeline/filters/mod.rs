// src/pipeline/filters/mod.rs

mod age;
mod experience;
mod name;

// Re-export the stage types
pub use age::MaxAgeFilter;
pub use age::MinAgeFilter;
pub use experience::ExperienceFilter;
pub use name::NamePatternFilter;
