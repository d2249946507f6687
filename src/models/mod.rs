pub mod competency;
pub mod course;

pub use competency::{Competency, CompetencyRequest};
pub use course::{Course, NewCourseRequest};
