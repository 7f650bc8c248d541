use crate::data_model::Person;
use crate::error::Result;

/// Trait for the terminal consumer of a pipeline run.
pub trait RecordSink: Send {
    /// Consume one record that survived every stage.
    fn accept(&mut self, person: Person) -> Result<()>;

    /// Called exactly once after the last delivery of a run that reached a
    /// clean end of stream. Not called for cancelled or failed runs.
    fn finish(&mut self) -> Result<()>;
}
