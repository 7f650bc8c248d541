use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

use crate::cancellation::CancellationToken;
use crate::data_model::Person;
use crate::error::{PipelineError, Result};
use crate::pipeline::sinks::RecordSink;
use crate::pipeline::sources::RecordSource;
use crate::utils::prometheus_metrics::*;

// Use async_trait for async predicate stages
#[async_trait]
pub trait FilterStage: Send + Sync {
    // Send + Sync needed because stages are shared with spawned tasks
    fn name(&self) -> &'static str; // For logging/error reporting

    /// Decide whether the record moves on. `Ok(true)` forwards it, `Ok(false)`
    /// drops it silently. An error is fatal to the whole run.
    async fn evaluate(&self, person: &Person) -> Result<bool>;
}

/// Per-stage accounting for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageStats {
    pub name: String,
    pub received: u64,
    pub forwarded: u64,
    pub dropped: u64,
}

impl StageStats {
    fn new(name: &str) -> Self {
        StageStats {
            name: name.to_string(),
            received: 0,
            forwarded: 0,
            dropped: 0,
        }
    }
}

/// Outcome of a run that terminated without error.
///
/// `cancelled` distinguishes a stream that was cut short from one that
/// reached a clean end; counters cover whatever part of the stream ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub produced: u64,
    pub delivered: u64,
    pub stages: Vec<StageStats>,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Total records dropped across all stages.
    pub fn dropped(&self) -> u64 {
        self.stages.iter().map(|s| s.dropped).sum()
    }
}

/// An ordered chain of predicate stages plus the channel plumbing to drive
/// a record stream through them.
///
/// Each stage runs in its own task, connected to its neighbours by bounded
/// channels. The default channel capacity of 1 means a stage holds at most
/// one record while one more waits in its inbox, so a slow sink stalls the
/// source instead of letting records pile up.
pub struct Pipeline {
    stages: Vec<Arc<dyn FilterStage>>,
    capacity: usize,
}

impl Pipeline {
    pub const DEFAULT_CAPACITY: usize = 1;

    pub fn new(stages: Vec<Arc<dyn FilterStage>>) -> Self {
        if stages.is_empty() {
            warn!("Pipeline created with no stages; records pass straight through.");
        }
        Pipeline {
            stages,
            capacity: Self::DEFAULT_CAPACITY,
        }
    }

    /// Overrides the per-channel capacity. Values below 1 are clamped.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Runs the stream from `source` through every stage into `sink`.
    pub async fn run<S, K>(&self, source: S, sink: &mut K) -> Result<RunSummary>
    where
        S: RecordSource + 'static,
        K: RecordSink + ?Sized,
    {
        self.run_with_token(source, sink, CancellationToken::new())
            .await
    }

    /// Like [`Pipeline::run`], with a caller-held token that can cut the
    /// stream short. Cancellation is a normal outcome, not an error: the
    /// summary comes back with `cancelled` set and the sink's `finish` is
    /// skipped.
    #[instrument(skip(self, source, sink, token), fields(num_stages = self.stages.len(), capacity = self.capacity))]
    pub async fn run_with_token<S, K>(
        &self,
        source: S,
        sink: &mut K,
        token: CancellationToken,
    ) -> Result<RunSummary>
    where
        S: RecordSource + 'static,
        K: RecordSink + ?Sized,
    {
        let started = Instant::now();
        ACTIVE_RUNS.inc();

        let (source_tx, mut next_rx) = mpsc::channel::<Person>(self.capacity);
        let source_span = info_span!("source");
        let source_handle =
            tokio::spawn(source_task(source, source_tx, token.clone()).instrument(source_span));

        let mut stage_handles = Vec::with_capacity(self.stages.len());
        for (index, stage) in self.stages.iter().enumerate() {
            let (tx, rx) = mpsc::channel::<Person>(self.capacity);
            let rx_in = std::mem::replace(&mut next_rx, rx);
            let span = info_span!("stage", index, name = stage.name());
            stage_handles.push(tokio::spawn(
                stage_task(Arc::clone(stage), rx_in, tx, token.clone()).instrument(span),
            ));
        }
        let mut sink_rx = next_rx;

        // The run future itself is the terminal pull point: records are
        // handed to the sink here, never inside a task, so the caller keeps
        // ownership of the sink.
        let mut delivered: u64 = 0;
        let mut finished_cleanly = false;
        let mut sink_error: Option<PipelineError> = None;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Delivery loop stopped by cancellation");
                    break;
                }
                received = sink_rx.recv() => match received {
                    Some(person) => match sink.accept(person) {
                        Ok(()) => {
                            delivered += 1;
                            RECORDS_DELIVERED_TOTAL.inc();
                        }
                        Err(e) => {
                            // Cancel before the receiver drops so upstream
                            // sees a cancelled run, not a closed handle.
                            token.cancel();
                            sink_error = Some(e);
                            break;
                        }
                    },
                    None => {
                        finished_cleanly = true;
                        break;
                    }
                }
            }
        }

        // Every task is unwinding by now: end of stream, cancellation, or
        // its own failure. Join in pipeline order and keep the first error.
        let mut task_error: Option<PipelineError> = None;
        let mut produced: u64 = 0;
        match source_handle.await {
            Ok(Ok(count)) => produced = count,
            Ok(Err(e)) => task_error = Some(e),
            Err(e) => task_error = Some(PipelineError::from(e)),
        }
        let mut stage_stats = Vec::with_capacity(self.stages.len());
        for joined in join_all(stage_handles).await {
            match joined {
                Ok(Ok(stats)) => stage_stats.push(stats),
                Ok(Err(e)) => task_error = task_error.or(Some(e)),
                Err(e) => task_error = task_error.or(Some(PipelineError::from(e))),
            }
        }
        ACTIVE_RUNS.dec();

        if let Some(e) = task_error {
            error!(error = %e, "Pipeline run failed");
            return Err(e);
        }
        if let Some(e) = sink_error {
            error!(error = %e, "Sink rejected a delivery");
            return Err(e);
        }

        if finished_cleanly {
            sink.finish()?;
        } else {
            RUNS_CANCELLED_TOTAL.inc();
        }

        let elapsed = started.elapsed();
        RUN_DURATION_SECONDS.observe(elapsed.as_secs_f64());
        info!(
            produced,
            delivered,
            cancelled = !finished_cleanly,
            "Pipeline run complete"
        );
        Ok(RunSummary {
            produced,
            delivered,
            stages: stage_stats,
            cancelled: !finished_cleanly,
            elapsed,
        })
    }

    /// Single-task variant: pulls each record through every stage in turn
    /// without spawning or channels. Same observable results for a clean
    /// stream; useful as a baseline and for callers that want the pipeline
    /// on the current task only.
    pub async fn run_sequential<S, K>(&self, source: S, sink: &mut K) -> Result<RunSummary>
    where
        S: RecordSource,
        K: RecordSink + ?Sized,
    {
        self.run_sequential_with_token(source, sink, CancellationToken::new())
            .await
    }

    /// Sequential variant with a caller-held token, checked before each new
    /// record is pulled from the source.
    pub async fn run_sequential_with_token<S, K>(
        &self,
        mut source: S,
        sink: &mut K,
        token: CancellationToken,
    ) -> Result<RunSummary>
    where
        S: RecordSource,
        K: RecordSink + ?Sized,
    {
        let started = Instant::now();
        let mut stage_stats: Vec<StageStats> = self
            .stages
            .iter()
            .map(|stage| StageStats::new(stage.name()))
            .collect();
        let mut produced: u64 = 0;
        let mut delivered: u64 = 0;
        let mut cancelled = false;

        let stream = source.produce()?;
        'records: for item in stream {
            if token.is_cancelled() {
                cancelled = true;
                break;
            }
            let person = item?;
            produced += 1;
            RECORDS_PRODUCED_TOTAL.inc();

            for (index, stage) in self.stages.iter().enumerate() {
                stage_stats[index].received += 1;
                let keep = match stage.evaluate(&person).await {
                    Ok(keep) => keep,
                    Err(e) => {
                        PREDICATE_FAILURES_TOTAL
                            .with_label_values(&[stage.name()])
                            .inc();
                        return Err(PipelineError::PredicateFailed {
                            stage_name: stage.name().to_string(),
                            source: Box::new(e),
                        });
                    }
                };
                if !keep {
                    stage_stats[index].dropped += 1;
                    RECORDS_DROPPED_TOTAL
                        .with_label_values(&[stage.name()])
                        .inc();
                    debug!(stage = stage.name(), person = %person, "Record dropped");
                    continue 'records;
                }
                stage_stats[index].forwarded += 1;
                RECORDS_FORWARDED_TOTAL
                    .with_label_values(&[stage.name()])
                    .inc();
            }

            sink.accept(person)?;
            delivered += 1;
            RECORDS_DELIVERED_TOTAL.inc();
        }

        if cancelled {
            RUNS_CANCELLED_TOTAL.inc();
        } else {
            sink.finish()?;
        }
        let elapsed = started.elapsed();
        RUN_DURATION_SECONDS.observe(elapsed.as_secs_f64());
        info!(produced, delivered, cancelled, "Sequential pipeline run complete");
        Ok(RunSummary {
            produced,
            delivered,
            stages: stage_stats,
            cancelled,
            elapsed,
        })
    }
}

async fn source_task<S: RecordSource>(
    mut source: S,
    tx: mpsc::Sender<Person>,
    token: CancellationToken,
) -> Result<u64> {
    let source_name = source.name();
    let stream = match source.produce() {
        Ok(stream) => stream,
        Err(e) => {
            // Downstream must not mistake a failed stream for a clean one.
            token.cancel();
            return Err(e);
        }
    };

    let mut produced: u64 = 0;
    for item in stream {
        let person = match item {
            Ok(person) => person,
            Err(e) => {
                token.cancel();
                return Err(e);
            }
        };
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(source = source_name, produced, "Source stopped by cancellation");
                return Ok(produced);
            }
            sent = tx.send(person) => {
                if sent.is_err() {
                    if token.is_cancelled() {
                        return Ok(produced);
                    }
                    token.cancel();
                    return Err(PipelineError::HandleClosed {
                        stage_name: source_name.to_string(),
                    });
                }
                produced += 1;
                RECORDS_PRODUCED_TOTAL.inc();
            }
        }
    }
    debug!(source = source_name, produced, "Source reached end of stream");
    Ok(produced)
}

async fn stage_task(
    stage: Arc<dyn FilterStage>,
    mut rx: mpsc::Receiver<Person>,
    tx: mpsc::Sender<Person>,
    token: CancellationToken,
) -> Result<StageStats> {
    let name = stage.name();
    let mut stats = StageStats::new(name);

    loop {
        let person = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(stage = name, "Stage stopped by cancellation");
                return Ok(stats);
            }
            received = rx.recv() => match received {
                Some(person) => person,
                None => break,
            }
        };
        stats.received += 1;

        let keep = match stage.evaluate(&person).await {
            Ok(keep) => keep,
            Err(e) => {
                PREDICATE_FAILURES_TOTAL.with_label_values(&[name]).inc();
                // Cancel before this task's channel handles drop, so the
                // neighbours unwind as cancelled rather than closed.
                token.cancel();
                return Err(PipelineError::PredicateFailed {
                    stage_name: name.to_string(),
                    source: Box::new(e),
                });
            }
        };

        if !keep {
            stats.dropped += 1;
            RECORDS_DROPPED_TOTAL.with_label_values(&[name]).inc();
            debug!(stage = name, person = %person, "Record dropped");
            continue;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(stage = name, "Stage stopped by cancellation");
                return Ok(stats);
            }
            sent = tx.send(person) => {
                if sent.is_err() {
                    if token.is_cancelled() {
                        return Ok(stats);
                    }
                    token.cancel();
                    return Err(PipelineError::HandleClosed {
                        stage_name: name.to_string(),
                    });
                }
                stats.forwarded += 1;
                RECORDS_FORWARDED_TOTAL.with_label_values(&[name]).inc();
            }
        }
    }

    debug!(
        stage = name,
        received = stats.received,
        forwarded = stats.forwarded,
        dropped = stats.dropped,
        "Stage reached end of stream"
    );
    Ok(stats)
}
