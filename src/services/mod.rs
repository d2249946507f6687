pub mod competency_editor;
pub mod confirm;
pub mod course_form;
pub mod store;

pub use competency_editor::{CompetencyEditor, EditorState};
pub use confirm::{Confirmation, PendingAction};
pub use course_form::CourseForm;
pub use store::{CourseSnapshot, CourseStore};
