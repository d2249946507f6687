use serde_json::json;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::gateway::CancelToken;
use crate::models::Course;
use crate::services::CourseStore;
use crate::validation::CourseInput;

/// The "create subject" form.
pub struct CourseForm {
    store: CourseStore,
    cancel: CancelToken,
    input: CourseInput,
    submitting: bool,
    error: Option<String>,
}

impl CourseForm {
    pub fn new(store: CourseStore, cancel: CancelToken) -> Self {
        Self {
            store,
            cancel,
            input: CourseInput::default(),
            submitting: false,
            error: None,
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.input.title = title.into();
    }

    pub fn set_credits(&mut self, credits: impl Into<String>) {
        self.input.credits = credits.into();
    }

    pub fn input(&self) -> &CourseInput {
        &self.input
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Whether the submit button is enabled.
    pub fn can_submit(&self) -> bool {
        !self.submitting && self.input.validate().is_ok()
    }

    /// Validate, create the course and refresh the shared collection.
    ///
    /// Invalid input is rejected without touching the backend. On failure the
    /// typed input is kept.
    pub async fn submit(&mut self) -> Result<Course, ApiError> {
        let req = match self.input.validate() {
            Ok(req) => req,
            Err(e) => {
                warn!("Rejected course input: {}", e);
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        self.submitting = true;
        self.error = None;
        let result = self
            .cancel
            .run(self.store.api().create_course(&req))
            .await;
        self.submitting = false;

        match result {
            Ok(course) => {
                self.store.events().log_event(
                    "course_created",
                    json!({ "id": course.id, "title": course.title }),
                );
                info!("Created course {} ({})", course.title, course.id);
                self.input = CourseInput::default();

                if let Err(e) = self.store.refresh_scoped(&self.cancel).await {
                    warn!("Refresh after creating course failed: {}", e);
                }
                Ok(course)
            }
            Err(e) => {
                error!("Error creating course: {}", e);
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}
