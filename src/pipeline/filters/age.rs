use async_trait::async_trait;

use crate::data_model::Person;
use crate::error::Result;
use crate::executor::FilterStage;

/// Passes records whose age is at most the configured bound (inclusive).
pub struct MaxAgeFilter {
    max_age: u32,
}

impl MaxAgeFilter {
    pub fn new(max_age: u32) -> Self {
        MaxAgeFilter { max_age }
    }
}

#[async_trait]
impl FilterStage for MaxAgeFilter {
    fn name(&self) -> &'static str {
        "MaxAgeFilter"
    }

    async fn evaluate(&self, person: &Person) -> Result<bool> {
        Ok(person.age <= self.max_age)
    }
}

/// Passes records whose age is at least the configured bound (inclusive).
pub struct MinAgeFilter {
    min_age: u32,
}

impl MinAgeFilter {
    pub fn new(min_age: u32) -> Self {
        MinAgeFilter { min_age }
    }
}

#[async_trait]
impl FilterStage for MinAgeFilter {
    fn name(&self) -> &'static str {
        "MinAgeFilter"
    }

    async fn evaluate(&self, person: &Person) -> Result<bool> {
        Ok(person.age >= self.min_age)
    }
}
