use serde::{Deserialize, Serialize};

/// A named sub-skill of a course. The owning course is only known through the
/// resource path it was fetched from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competency {
    pub id: i64,
    pub name: String,
    pub marks: i32,
}

/// Body of both the create (`POST`) and update (`PUT`) competency calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyRequest {
    pub name: String,
    pub marks: i32,
}
