use std::fs;
use std::path::PathBuf;

use crate::data_model::Person;
use crate::error::{PipelineError, Result};
use crate::pipeline::sources::RecordSource;

/// Reads a roster of records from a YAML file (a sequence of maps with
/// `name`, `age`, `experience` keys).
///
/// The whole file is parsed up front, so a malformed document fails the run
/// before any record enters the pipeline.
#[derive(Debug)]
pub struct YamlRosterSource {
    path: PathBuf,
    consumed: bool,
}

impl YamlRosterSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        YamlRosterSource {
            path: path.into(),
            consumed: false,
        }
    }
}

impl RecordSource for YamlRosterSource {
    fn name(&self) -> &'static str {
        "YamlRosterSource"
    }

    fn produce(&mut self) -> Result<Box<dyn Iterator<Item = Result<Person>> + Send>> {
        if self.consumed {
            return Err(PipelineError::SourceError {
                source_name: self.name().to_string(),
                reason: "stream already produced".to_string(),
            });
        }
        self.consumed = true;

        let raw = fs::read_to_string(&self.path).map_err(|e| PipelineError::SourceError {
            source_name: self.name().to_string(),
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let people: Vec<Person> =
            serde_yaml::from_str(&raw).map_err(|e| PipelineError::SourceError {
                source_name: self.name().to_string(),
                reason: format!("failed to parse {}: {}", self.path.display(), e),
            })?;

        Ok(Box::new(people.into_iter().map(Ok)))
    }
}
