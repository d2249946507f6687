use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::{CompetencyRequest, NewCourseRequest};

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 10;

/// Trimmed, non-empty text.
pub fn require_text(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(value.to_string())
}

/// Whole number in `[MIN_SCORE, MAX_SCORE]`.
pub fn parse_score(field: &'static str, raw: &str) -> Result<i32, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::Required(field));
    }

    let parsed: i64 = value.parse().map_err(|_| ValidationError::NotAnInteger {
        field,
        value: value.to_string(),
    })?;

    if parsed < i64::from(MIN_SCORE) || parsed > i64::from(MAX_SCORE) {
        return Err(ValidationError::OutOfRange {
            field,
            value: parsed,
            min: MIN_SCORE,
            max: MAX_SCORE,
        });
    }

    Ok(parsed as i32)
}

/// Raw contents of the course form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseInput {
    pub title: String,
    pub credits: String,
}

impl CourseInput {
    pub fn validate(&self) -> Result<NewCourseRequest, ValidationError> {
        Ok(NewCourseRequest {
            title: require_text("title", &self.title)?,
            credits: parse_score("credits", &self.credits)?,
        })
    }
}

/// Raw contents of the competency form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetencyInput {
    pub name: String,
    pub marks: String,
}

impl CompetencyInput {
    pub fn validate(&self) -> Result<CompetencyRequest, ValidationError> {
        Ok(CompetencyRequest {
            name: require_text("name", &self.name)?,
            marks: parse_score("marks", &self.marks)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(title: &str, credits: &str) -> CourseInput {
        CourseInput {
            title: title.to_string(),
            credits: credits.to_string(),
        }
    }

    #[test]
    fn test_scores_at_bounds_are_accepted() {
        assert_eq!(parse_score("marks", "0"), Ok(0));
        assert_eq!(parse_score("marks", "10"), Ok(10));
        assert_eq!(parse_score("marks", " 7 "), Ok(7));
    }

    #[test]
    fn test_scores_outside_range_are_rejected() {
        for raw in ["-1", "11", "9999999999999"] {
            assert!(
                matches!(parse_score("marks", raw), Err(ValidationError::OutOfRange { .. })),
                "{raw} should be out of range"
            );
        }
    }

    #[test]
    fn test_non_integer_scores_are_rejected() {
        for raw in ["7.5", "seven", "1e1", "0x5"] {
            assert!(
                matches!(parse_score("marks", raw), Err(ValidationError::NotAnInteger { .. })),
                "{raw} should not parse"
            );
        }
        assert_eq!(parse_score("marks", "  "), Err(ValidationError::Required("marks")));
    }

    #[test]
    fn test_course_input() {
        let req = course("  Data Structures ", "8").validate().expect("valid course");
        assert_eq!(req.title, "Data Structures");
        assert_eq!(req.credits, 8);

        assert_eq!(course("   ", "8").validate(), Err(ValidationError::Required("title")));
        assert!(course("Signal Processing", "12").validate().is_err());
    }

    #[test]
    fn test_competency_marks_eleven_is_rejected() {
        let input = CompetencyInput {
            name: "Arrays".to_string(),
            marks: "11".to_string(),
        };
        let err = input.validate().expect_err("11 is out of range");
        assert_eq!(err.to_string(), "marks must be between 0 and 10, got 11");
    }
}
