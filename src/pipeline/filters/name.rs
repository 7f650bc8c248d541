use async_trait::async_trait;
use regex::Regex;

use crate::data_model::Person;
use crate::error::{PipelineError, Result};
use crate::executor::FilterStage;

/// Passes records whose name matches the configured regular expression.
///
/// The pattern is compiled once at construction, so evaluation itself is
/// total: a bad pattern is a configuration error, not a predicate failure.
#[derive(Debug)]
pub struct NamePatternFilter {
    pattern: Regex,
}

impl NamePatternFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            PipelineError::ConfigError(format!("Invalid name pattern '{}': {}", pattern, e))
        })?;
        Ok(NamePatternFilter { pattern })
    }
}

#[async_trait]
impl FilterStage for NamePatternFilter {
    fn name(&self) -> &'static str {
        "NamePatternFilter"
    }

    async fn evaluate(&self, person: &Person) -> Result<bool> {
        Ok(self.pattern.is_match(&person.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::Experience;

    fn named(name: &str) -> Person {
        Person::new(name, 30, Experience::Mid)
    }

    #[tokio::test]
    async fn test_matches_substring_by_default() {
        let filter = NamePatternFilter::new("Developer").unwrap();
        assert!(filter.evaluate(&named("Developer 3")).await.unwrap());
        assert!(!filter.evaluate(&named("Designer 3")).await.unwrap());
    }

    #[tokio::test]
    async fn test_anchored_pattern() {
        let filter = NamePatternFilter::new(r"^Developer \d$").unwrap();
        assert!(filter.evaluate(&named("Developer 5")).await.unwrap());
        assert!(!filter.evaluate(&named("Developer 10")).await.unwrap());
        assert!(!filter.evaluate(&named("Lead Developer 5")).await.unwrap());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = NamePatternFilter::new("(unclosed").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }
}
