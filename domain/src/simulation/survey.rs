use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const AGE_RANGE: RangeInclusive<u8> = 10..=100;
const EXPERIENCE_RANGE: RangeInclusive<u8> = 1..=10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveyError {
    #[error("age {0} outside 10..=100")]
    AgeOutOfRange(u8),

    #[error("trading experience {0} outside 1..=10")]
    ExperienceOutOfRange(u8),
}

/// Answers collected before the game starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub age: u8,
    /// Self-rated trading experience, 1 to 10.
    pub experience: u8,
    #[serde(default)]
    pub study_field: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub source_ip: Option<String>,
}

impl SurveyResponse {
    /// Checks the ranges and trims free-text answers; a blank email becomes
    /// `None`.
    pub fn normalized(self) -> Result<Self, SurveyError> {
        if !AGE_RANGE.contains(&self.age) {
            return Err(SurveyError::AgeOutOfRange(self.age));
        }
        if !EXPERIENCE_RANGE.contains(&self.experience) {
            return Err(SurveyError::ExperienceOutOfRange(self.experience));
        }
        let email = self
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());
        Ok(Self {
            study_field: self.study_field.trim().to_string(),
            gender: self.gender.trim().to_string(),
            email,
            ..self
        })
    }
}
