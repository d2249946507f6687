use serde_json::json;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::gateway::CancelToken;
use crate::models::Competency;
use crate::services::{Confirmation, CourseStore, PendingAction};
use crate::validation::CompetencyInput;

/// Where the competency form is in its edit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    /// `Some(id)` edits an existing competency, `None` creates a new one.
    Editing(Option<i64>),
    Submitting(Option<i64>),
}

/// Competency management for a single course.
pub struct CompetencyEditor {
    store: CourseStore,
    cancel: CancelToken,
    course_id: i64,
    course_title: String,
    competencies: Vec<Competency>,
    state: EditorState,
    input: CompetencyInput,
    error: Option<String>,
    confirmation: Confirmation,
}

impl CompetencyEditor {
    pub fn new(store: CourseStore, cancel: CancelToken, course_id: i64) -> Self {
        Self {
            store,
            cancel,
            course_id,
            course_title: fallback_title(course_id),
            competencies: Vec::new(),
            state: EditorState::Idle,
            input: CompetencyInput::default(),
            error: None,
            confirmation: Confirmation::default(),
        }
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    pub fn course_title(&self) -> &str {
        &self.course_title
    }

    pub fn competencies(&self) -> &[Competency] {
        &self.competencies
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn input(&self) -> &CompetencyInput {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn confirmation_prompt(&self) -> Option<String> {
        self.confirmation.prompt()
    }

    /// Load the course title and its competencies.
    pub async fn open(&mut self) {
        match self.cancel.run(self.store.api().get_course(self.course_id)).await {
            Ok(course) if !course.title.is_empty() => {
                self.course_title = course.title;
                self.error = None;
            }
            Ok(_) => {
                self.course_title = fallback_title(self.course_id);
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching course title for {}: {}", self.course_id, e);
                self.course_title = fallback_title(self.course_id);
                self.error = Some("Failed to fetch course title".to_string());
            }
        }

        self.reload_competencies().await;
    }

    pub async fn reload_competencies(&mut self) {
        match self
            .cancel
            .run(self.store.api().list_competencies(self.course_id))
            .await
        {
            Ok(competencies) => {
                self.competencies = competencies;
                self.error = None;
            }
            Err(e) => {
                warn!("Error fetching competencies for {}: {}", self.course_id, e);
                self.error = Some("Failed to fetch competencies".to_string());
            }
        }
    }

    pub fn begin_create(&mut self) {
        self.input = CompetencyInput::default();
        self.error = None;
        self.state = EditorState::Editing(None);
    }

    /// Pre-fill the form from a listed competency. Returns `false` if the id
    /// is not in the current list.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        let Some(competency) = self.competencies.iter().find(|c| c.id == id) else {
            return false;
        };
        self.input = CompetencyInput {
            name: competency.name.clone(),
            marks: competency.marks.to_string(),
        };
        self.error = None;
        self.state = EditorState::Editing(Some(id));
        true
    }

    pub fn cancel_edit(&mut self) {
        self.input = CompetencyInput::default();
        self.state = EditorState::Idle;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.input.name = name.into();
    }

    pub fn set_marks(&mut self, marks: impl Into<String>) {
        self.input.marks = marks.into();
    }

    /// Create or update depending on the current state, then refresh both the
    /// competency list and the shared course collection.
    pub async fn submit(&mut self) -> Result<Competency, ApiError> {
        let target = match self.state {
            EditorState::Idle => None,
            EditorState::Editing(target) | EditorState::Submitting(target) => target,
        };

        let req = match self.input.validate() {
            Ok(req) => req,
            Err(e) => {
                warn!("Rejected competency input: {}", e);
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let resume = self.state;
        self.state = EditorState::Submitting(target);
        let api = self.store.api();
        let result = match target {
            Some(id) => self.cancel.run(api.update_competency(id, &req)).await,
            None => {
                self.cancel
                    .run(api.create_competency(self.course_id, &req))
                    .await
            }
        };

        match result {
            Ok(competency) => {
                self.input = CompetencyInput::default();
                self.state = EditorState::Idle;
                self.error = None;

                let event = if target.is_some() {
                    "competency_updated"
                } else {
                    "competency_added"
                };
                self.store.events().log_event(
                    event,
                    json!({
                        "courseId": self.course_id,
                        "id": competency.id,
                        "name": competency.name,
                    }),
                );
                info!("{} {} on course {}", event, competency.id, self.course_id);

                self.reload_competencies().await;
                if let Err(e) = self.store.refresh_scoped(&self.cancel).await {
                    warn!("Refresh after competency change failed: {}", e);
                }
                Ok(competency)
            }
            Err(e) => {
                warn!("Error adding/updating competency: {}", e);
                self.state = resume;
                self.error = Some(format!("Failed to add/update competency: {}", e.user_message()));
                Err(e)
            }
        }
    }

    /// Ask for confirmation before deleting. Returns `false` if the id is not
    /// in the current list.
    pub fn request_delete(&mut self, id: i64) -> bool {
        let Some(competency) = self.competencies.iter().find(|c| c.id == id) else {
            return false;
        };
        self.confirmation.request(PendingAction::DeleteCompetency {
            id,
            name: competency.name.clone(),
        });
        true
    }

    pub fn cancel_delete(&mut self) {
        self.confirmation.cancel();
    }

    /// Execute the confirmed deletion. `Ok(false)` when nothing was pending.
    pub async fn confirm_delete(&mut self) -> Result<bool, ApiError> {
        let Some(PendingAction::DeleteCompetency { id, .. }) = self.confirmation.confirm() else {
            return Ok(false);
        };

        if let Err(e) = self
            .cancel
            .run(self.store.api().delete_competency(id))
            .await
        {
            warn!("Error deleting competency {}: {}", id, e);
            self.error = Some("Failed to delete competency".to_string());
            return Err(e);
        }

        if self.state == EditorState::Editing(Some(id)) {
            self.cancel_edit();
        }
        self.store.events().log_event(
            "competency_deleted",
            json!({ "courseId": self.course_id, "id": id }),
        );
        self.reload_competencies().await;
        if let Err(e) = self.store.refresh_scoped(&self.cancel).await {
            warn!("Refresh after deleting competency failed: {}", e);
        }
        Ok(true)
    }
}

fn fallback_title(course_id: i64) -> String {
    format!("Course {}", course_id)
}
