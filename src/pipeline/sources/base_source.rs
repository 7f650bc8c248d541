use crate::data_model::Person;
use crate::error::Result;

/// Trait for producing the bounded record stream a pipeline run consumes.
///
/// A source is single-shot: `produce` hands over the whole stream once, and
/// a second call must return a `SourceError`. Items are `Result` so a source
/// can fail mid-stream after yielding some records.
pub trait RecordSource: Send {
    /// Name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Hand over the record stream.
    fn produce(&mut self) -> Result<Box<dyn Iterator<Item = Result<Person>> + Send>>;
}
