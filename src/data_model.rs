use serde::{Deserialize, Serialize};
use std::fmt;

/// Experience classification for a record. A closed tag set: nothing in the
/// pipeline varies behavior by level except predicate evaluation, so this is
/// a plain enum rather than a trait hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Experience {
    Junior,
    Mid,
    Senior,
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self {
            Experience::Junior => "junior",
            Experience::Mid => "mid",
            Experience::Senior => "senior",
        };
        f.write_str(level)
    }
}

/// The record type flowing through the pipeline. Immutable once created by a
/// source: stages forward it by value or drop it, nothing rewrites fields in
/// flight, and the sink consumes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub experience: Experience,
}

impl Person {
    pub fn new(name: impl Into<String>, age: u32, experience: Experience) -> Self {
        Person {
            name: name.into(),
            age,
            experience,
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (age {}, {})", self.name, self.age, self.experience)
    }
}
