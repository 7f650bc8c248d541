// src/runner.rs

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, info, info_span, instrument, warn};

use crate::cancellation::CancellationToken;
use crate::config::cli::Args;
use crate::config::pipeline::{PipelineConfig, StageConfig};
use crate::data_model::Person;
use crate::error::Result;
use crate::executor::{FilterStage, Pipeline, RunSummary};
use crate::pipeline::filters::{ExperienceFilter, MaxAgeFilter, MinAgeFilter, NamePatternFilter};
use crate::pipeline::sinks::{ConsoleSink, OutputFormat, RecordSink};
use crate::pipeline::sources::{RecordSource, RosterSource, YamlRosterSource};

/// Builds the stage chain based on the configuration read from YAML.
#[instrument(skip(config), fields(num_stages = config.pipeline.len()))]
pub fn build_pipeline_from_config(config: &PipelineConfig) -> Result<Vec<Arc<dyn FilterStage>>> {
    let mut stages: Vec<Arc<dyn FilterStage>> = Vec::new();
    info!("Building pipeline from configuration...");

    for (i, stage_config) in config.pipeline.iter().enumerate() {
        let stage_span = info_span!("pipeline_stage", index = i, stage = stage_config.name());
        let _enter = stage_span.enter();

        let stage: Arc<dyn FilterStage> = match stage_config {
            StageConfig::MaxAgeFilter(params) => {
                debug!(params = ?params, "Adding MaxAgeFilter");
                Arc::new(MaxAgeFilter::new(params.max_age))
            }
            StageConfig::MinAgeFilter(params) => {
                debug!(params = ?params, "Adding MinAgeFilter");
                Arc::new(MinAgeFilter::new(params.min_age))
            }
            StageConfig::ExperienceFilter(params) => {
                debug!(params = ?params, "Adding ExperienceFilter");
                Arc::new(ExperienceFilter::new(params.level))
            }
            StageConfig::NamePatternFilter(params) => {
                debug!(params = ?params, "Adding NamePatternFilter");
                Arc::new(NamePatternFilter::new(&params.pattern)?)
            }
        };
        stages.push(stage);
        info!("Added stage: {}", stage_config.name());
    }

    if stages.is_empty() {
        warn!("Warning: Building an empty pipeline from configuration!");
    } else {
        info!(
            "Pipeline built: {}",
            config.pipeline.iter().map(|c| c.name()).join(" -> ")
        );
    }
    Ok(stages)
}

/// Sink adapter that cancels the run after a fixed number of deliveries.
struct TakeSink {
    inner: Box<dyn RecordSink>,
    token: CancellationToken,
    remaining: u64,
}

impl TakeSink {
    fn new(inner: Box<dyn RecordSink>, token: CancellationToken, quota: u64) -> Self {
        TakeSink {
            inner,
            token,
            remaining: quota,
        }
    }
}

impl RecordSink for TakeSink {
    fn accept(&mut self, person: Person) -> Result<()> {
        self.inner.accept(person)?;
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                debug!("Delivery quota reached; cancelling the run");
                self.token.cancel();
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.inner.finish()
    }
}

/// Resolves arguments and configuration into one pipeline run.
pub async fn execute_run(config: &PipelineConfig, args: &Args) -> Result<RunSummary> {
    let stages = build_pipeline_from_config(config)?;
    let capacity = args.capacity.unwrap_or(config.capacity);
    let pipeline = Pipeline::new(stages).with_capacity(capacity);

    let label = args
        .label
        .clone()
        .unwrap_or_else(|| config.output.label.clone());
    let format = args
        .format
        .map(OutputFormat::from)
        .unwrap_or(config.output.format);

    let token = CancellationToken::new();
    let mut sink: Box<dyn RecordSink> = Box::new(ConsoleSink::new(label, format));
    match args.take {
        Some(0) => token.cancel(),
        Some(quota) => sink = Box::new(TakeSink::new(sink, token.clone(), quota)),
        None => {}
    }

    match &args.roster {
        Some(path) => {
            info!("Streaming roster from: {}", path.display());
            dispatch(
                &pipeline,
                YamlRosterSource::new(path),
                sink.as_mut(),
                token,
                args.sequential,
            )
            .await
        }
        None => {
            info!("Streaming the built-in production line roster");
            dispatch(
                &pipeline,
                RosterSource::production_line(),
                sink.as_mut(),
                token,
                args.sequential,
            )
            .await
        }
    }
}

async fn dispatch<S>(
    pipeline: &Pipeline,
    source: S,
    sink: &mut dyn RecordSink,
    token: CancellationToken,
    sequential: bool,
) -> Result<RunSummary>
where
    S: RecordSource + 'static,
{
    if sequential {
        pipeline.run_sequential_with_token(source, sink, token).await
    } else {
        pipeline.run_with_token(source, sink, token).await
    }
}

/// Logs the end-of-run accounting block.
pub fn log_run_summary(summary: &RunSummary) {
    info!("--------------------");
    info!("Run Summary:");
    info!("  Records Produced: {}", summary.produced);
    for stats in &summary.stages {
        info!(
            "  Stage {}: received {}, forwarded {}, dropped {}",
            stats.name, stats.received, stats.forwarded, stats.dropped
        );
    }
    info!("  Records Dropped: {}", summary.dropped());
    info!("  Records Delivered: {}", summary.delivered);
    if summary.cancelled {
        warn!("  Run was cancelled before end of stream.");
    }
    info!("  Elapsed: {:?}", summary.elapsed);
    info!("--------------------");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::pipeline::{MaxAgeParams, NamePatternParams};
    use crate::data_model::Experience;
    use crate::error::PipelineError;
    use crate::pipeline::sinks::CollectSink;

    #[test]
    fn test_build_default_chain() {
        let config = PipelineConfig::default_chain();
        let stages = build_pipeline_from_config(&config).unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].name(), "MaxAgeFilter");
        assert_eq!(stages[1].name(), "ExperienceFilter");
    }

    #[test]
    fn test_build_rejects_bad_name_pattern() {
        let config = PipelineConfig {
            pipeline: vec![StageConfig::NamePatternFilter(NamePatternParams {
                pattern: "(unclosed".to_string(),
            })],
            ..PipelineConfig::default_chain()
        };
        let err = build_pipeline_from_config(&config).err().unwrap();
        assert!(matches!(err, PipelineError::ConfigError(_)));
    }

    #[test]
    fn test_build_all_stage_types() {
        let config = PipelineConfig {
            pipeline: vec![
                StageConfig::MaxAgeFilter(MaxAgeParams { max_age: 30 }),
                StageConfig::NamePatternFilter(NamePatternParams {
                    pattern: "^Developer".to_string(),
                }),
            ],
            ..PipelineConfig::default_chain()
        };
        let stages = build_pipeline_from_config(&config).unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[1].name(), "NamePatternFilter");
    }

    #[tokio::test]
    async fn test_take_sink_cancels_after_quota() {
        let token = CancellationToken::new();
        let mut sink = TakeSink::new(Box::new(CollectSink::new()), token.clone(), 2);

        sink.accept(Person::new("A", 1, Experience::Junior)).unwrap();
        assert!(!token.is_cancelled());
        sink.accept(Person::new("B", 2, Experience::Junior)).unwrap();
        assert!(token.is_cancelled());
    }
}
