use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::data_model::Experience;
use crate::error::{PipelineError, Result};
use crate::executor::Pipeline;
use crate::pipeline::sinks::OutputFormat;

/// Represents the overall pipeline configuration read from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct PipelineConfig {
    pub pipeline: Vec<StageConfig>,
    /// Per-channel capacity between stages.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Console output settings.
#[derive(Deserialize, Debug, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            label: default_label(),
            format: OutputFormat::default(),
        }
    }
}

fn default_capacity() -> usize {
    Pipeline::DEFAULT_CAPACITY
}

fn default_label() -> String {
    "Juniors under 25".to_string()
}

impl PipelineConfig {
    /// The built-in chain used when no configuration file is given: keep
    /// people aged 25 or under, then keep juniors.
    pub fn default_chain() -> Self {
        PipelineConfig {
            pipeline: vec![
                StageConfig::MaxAgeFilter(MaxAgeParams { max_age: 25 }),
                StageConfig::ExperienceFilter(ExperienceParams {
                    level: Experience::Junior,
                }),
            ],
            capacity: default_capacity(),
            output: OutputConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(PipelineError::ConfigValidationError(
                "capacity must be at least 1".to_string(),
            ));
        }
        for stage_config in &self.pipeline {
            stage_config.validate()?;
        }
        Ok(())
    }
}

/// Represents a single stage in the filtering pipeline.
/// Uses Serde's externally tagged enum representation.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type")] // The 'type' field in YAML determines which variant
pub enum StageConfig {
    MaxAgeFilter(MaxAgeParams),
    MinAgeFilter(MinAgeParams),
    ExperienceFilter(ExperienceParams),
    NamePatternFilter(NamePatternParams),
    // Add other filter/stage types here as needed
}

impl StageConfig {
    /// Returns a string slice representing the name of the stage type.
    pub fn name(&self) -> &'static str {
        match self {
            StageConfig::MaxAgeFilter(_) => "MaxAgeFilter",
            StageConfig::MinAgeFilter(_) => "MinAgeFilter",
            StageConfig::ExperienceFilter(_) => "ExperienceFilter",
            StageConfig::NamePatternFilter(_) => "NamePatternFilter",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            StageConfig::MaxAgeFilter(_) => Ok(()),
            StageConfig::MinAgeFilter(_) => Ok(()),
            StageConfig::ExperienceFilter(_) => Ok(()),
            StageConfig::NamePatternFilter(params) => params.validate(),
        }
    }
}

/// Parameters for the MaxAgeFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct MaxAgeParams {
    pub max_age: u32,
}

/// Parameters for the MinAgeFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct MinAgeParams {
    pub min_age: u32,
}

/// Parameters for the ExperienceFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct ExperienceParams {
    pub level: Experience,
}

/// Parameters for the NamePatternFilter.
#[derive(Deserialize, Debug, Clone)]
pub struct NamePatternParams {
    pub pattern: String,
}

impl NamePatternParams {
    pub fn validate(&self) -> Result<()> {
        regex::Regex::new(&self.pattern).map_err(|e| {
            PipelineError::ConfigValidationError(format!(
                "NamePatternParams: invalid pattern '{}': {}",
                self.pattern, e
            ))
        })?;
        Ok(())
    }
}

/// Loads and parses the pipeline configuration YAML file.
pub fn load_pipeline_config<P: AsRef<Path>>(config_path: P) -> Result<PipelineConfig> {
    let path_ref = config_path.as_ref();
    let config_content = fs::read_to_string(path_ref).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to read pipeline config file '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    let config: PipelineConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        PipelineError::ConfigError(format!(
            "Failed to parse pipeline config YAML from '{}': {}",
            path_ref.display(),
            e
        ))
    })?;

    config.validate()?; // Validate the loaded configuration

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Helper to create a temporary config file with given content
    fn create_temp_config_file(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "{}", content).expect("Failed to write to temp file");
        temp_file
    }

    #[test]
    fn test_load_valid_config() {
        let yaml_content = r#"
pipeline:
  - type: MaxAgeFilter
    max_age: 25
  - type: ExperienceFilter
    level: junior
capacity: 4
output:
  label: Junior shortlist
  format: json
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config_result = load_pipeline_config(temp_file.path());

        assert!(
            config_result.is_ok(),
            "Should load valid config: {:?}",
            config_result.err()
        );
        let config = config_result.unwrap();
        assert_eq!(config.pipeline.len(), 2);
        assert_eq!(config.capacity, 4);
        assert_eq!(config.output.label, "Junior shortlist");
        assert_eq!(config.output.format, OutputFormat::Json);
        match &config.pipeline[0] {
            StageConfig::MaxAgeFilter(params) => {
                assert_eq!(params.max_age, 25);
            }
            _ => panic!("Expected MaxAgeFilter"),
        }
        match &config.pipeline[1] {
            StageConfig::ExperienceFilter(params) => {
                assert_eq!(params.level, Experience::Junior);
            }
            _ => panic!("Expected ExperienceFilter"),
        }
    }

    #[test]
    fn test_defaults_apply_when_fields_omitted() {
        let yaml_content = r#"
pipeline:
  - type: MinAgeFilter
    min_age: 18
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config = load_pipeline_config(temp_file.path()).unwrap();

        assert_eq!(config.capacity, Pipeline::DEFAULT_CAPACITY);
        assert_eq!(config.output.label, "Juniors under 25");
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_unknown_stage_type_fails() {
        let yaml_content = r#"
pipeline:
  - type: TelepathyFilter
    strength: 11
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config_result = load_pipeline_config(temp_file.path());

        assert!(config_result.is_err());
        match config_result.err().unwrap() {
            PipelineError::ConfigError(msg) => {
                assert!(msg.contains("Failed to parse pipeline config YAML"));
            }
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_name_pattern_fails_validation() {
        let yaml_content = r#"
pipeline:
  - type: NamePatternFilter
    pattern: "(unclosed"
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config_result = load_pipeline_config(temp_file.path());

        assert!(matches!(
            config_result,
            Err(PipelineError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_zero_capacity_fails_validation() {
        let yaml_content = r#"
pipeline:
  - type: MaxAgeFilter
    max_age: 30
capacity: 0
        "#;
        let temp_file = create_temp_config_file(yaml_content);
        let config_result = load_pipeline_config(temp_file.path());

        assert!(matches!(
            config_result,
            Err(PipelineError::ConfigValidationError(_))
        ));
    }

    #[test]
    fn test_missing_config_file_fails() {
        let config_result = load_pipeline_config("/nonexistent/config.yaml");
        assert!(matches!(config_result, Err(PipelineError::ConfigError(_))));
    }

    #[test]
    fn test_default_chain_shape() {
        let config = PipelineConfig::default_chain();
        assert_eq!(config.pipeline.len(), 2);
        assert_eq!(config.pipeline[0].name(), "MaxAgeFilter");
        assert_eq!(config.pipeline[1].name(), "ExperienceFilter");
        assert!(config.validate().is_ok());
    }
}
