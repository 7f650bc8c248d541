use crate::data_model::Person;
use crate::error::Result;
use crate::pipeline::sinks::RecordSink;

/// Collects delivered records into memory. Used by tests and by callers that
/// want the surviving records as a `Vec` instead of printed output.
#[derive(Debug, Default)]
pub struct CollectSink {
    people: Vec<Person>,
    finished: bool,
}

impl CollectSink {
    pub fn new() -> Self {
        CollectSink::default()
    }

    /// Records delivered so far, in arrival order.
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    /// Whether the run reached a clean end of stream.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_people(self) -> Vec<Person> {
        self.people
    }
}

impl RecordSink for CollectSink {
    fn accept(&mut self, person: Person) -> Result<()> {
        self.people.push(person);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
