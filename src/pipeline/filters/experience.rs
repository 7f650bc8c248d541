use async_trait::async_trait;

use crate::data_model::{Experience, Person};
use crate::error::Result;
use crate::executor::FilterStage;

/// Passes records whose experience level equals the configured one.
pub struct ExperienceFilter {
    level: Experience,
}

impl ExperienceFilter {
    pub fn new(level: Experience) -> Self {
        ExperienceFilter { level }
    }
}

#[async_trait]
impl FilterStage for ExperienceFilter {
    fn name(&self) -> &'static str {
        "ExperienceFilter"
    }

    async fn evaluate(&self, person: &Person) -> Result<bool> {
        Ok(person.experience == self.level)
    }
}
