use serde::{Deserialize, Deserializer, Serialize};

use super::Competency;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub credits: i32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub competencies: Vec<Competency>,
}

impl Course {
    pub fn competency_count(&self) -> usize {
        self.competencies.len()
    }

    pub fn total_marks(&self) -> i64 {
        self.competencies.iter().map(|c| i64::from(c.marks)).sum()
    }
}

/// Body of `POST /courses`. Only built by [`crate::validation::CourseInput::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub title: String,
    pub credits: i32,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Competency>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Competency>>::deserialize(deserializer)?.unwrap_or_default())
}
