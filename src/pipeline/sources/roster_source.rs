use crate::data_model::{Experience, Person};
use crate::error::{PipelineError, Result};
use crate::pipeline::sources::RecordSource;

/// In-memory source backed by a fixed roster of records.
pub struct RosterSource {
    people: Option<Vec<Person>>,
}

impl RosterSource {
    pub fn new(people: Vec<Person>) -> Self {
        RosterSource {
            people: Some(people),
        }
    }

    /// The six-person staffing roster used by the default run and the
    /// documentation examples.
    pub fn production_line() -> Self {
        RosterSource::new(vec![
            Person::new("Developer 1", 22, Experience::Junior),
            Person::new("Developer 2", 15, Experience::Junior),
            Person::new("Developer 3", 47, Experience::Mid),
            Person::new("Developer 4", 14, Experience::Mid),
            Person::new("Developer 5", 23, Experience::Senior),
            Person::new("Developer 6", 19, Experience::Senior),
        ])
    }
}

impl RecordSource for RosterSource {
    fn name(&self) -> &'static str {
        "RosterSource"
    }

    fn produce(&mut self) -> Result<Box<dyn Iterator<Item = Result<Person>> + Send>> {
        match self.people.take() {
            Some(people) => Ok(Box::new(people.into_iter().map(Ok))),
            None => Err(PipelineError::SourceError {
                source_name: self.name().to_string(),
                reason: "stream already produced".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yields_roster_in_order() {
        let mut source = RosterSource::new(vec![
            Person::new("A", 1, Experience::Junior),
            Person::new("B", 2, Experience::Mid),
        ]);
        let people: Vec<Person> = source
            .produce()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "A");
        assert_eq!(people[1].name, "B");
    }

    #[test]
    fn test_second_produce_fails() {
        let mut source = RosterSource::production_line();
        let first = source.produce().unwrap();
        assert_eq!(first.count(), 6);
        let err = source.produce().err().unwrap();
        assert!(matches!(err, PipelineError::SourceError { .. }));
    }

    #[test]
    fn test_production_line_roster() {
        let mut source = RosterSource::production_line();
        let people: Vec<Person> = source
            .produce()
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(people.len(), 6);
        assert_eq!(people[0], Person::new("Developer 1", 22, Experience::Junior));
        assert_eq!(people[3], Person::new("Developer 4", 14, Experience::Mid));
        assert_eq!(people[5], Person::new("Developer 6", 19, Experience::Senior));
    }
}
