//! Presentation views over the shared course store.
//!
//! Every view holds a [`ViewHandle`]: a subscription to the store plus the
//! cancellation scope of the requests it issues. Dropping the view cancels
//! anything it still has in flight.

pub mod card_grid;
pub mod dashboard;
pub mod list;
pub mod table;

use std::any::Any;
use std::fmt::Display;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{error, info};

use crate::error::ApiError;
use crate::gateway::{CancelGuard, CancelToken};
use crate::models::Course;
use crate::services::{CompetencyEditor, Confirmation, CourseSnapshot, CourseStore, PendingAction};

pub use card_grid::{CardGrid, CourseCard};
pub use dashboard::{Dashboard, DashboardRender, DashboardStats};
pub use list::{ListItem, ListView};
pub use table::{TableRow, TableView};

/// The four mutually exclusive render states.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Failed {
        message: String,
        retry_count: u32,
        /// Courses from the last successful fetch, still shown under the banner.
        stale: Vec<Course>,
    },
    Empty,
    Ready { courses: Vec<Course> },
}

impl ViewState {
    pub fn from_snapshot(snapshot: &CourseSnapshot) -> Self {
        if snapshot.loading {
            return ViewState::Loading;
        }
        if let Some(message) = snapshot.error_message() {
            return ViewState::Failed {
                message,
                retry_count: snapshot.retry_count,
                stale: snapshot.courses.clone(),
            };
        }
        if snapshot.courses.is_empty() {
            if snapshot.loaded {
                ViewState::Empty
            } else {
                // Nothing fetched yet: the mount is about to start.
                ViewState::Loading
            }
        } else {
            ViewState::Ready {
                courses: snapshot.courses.clone(),
            }
        }
    }

    /// Courses to draw under this state.
    pub fn courses(&self) -> &[Course] {
        match self {
            ViewState::Failed { stale, .. } => stale,
            ViewState::Ready { courses } => courses,
            ViewState::Loading | ViewState::Empty => &[],
        }
    }
}

/// A view's subscription to the shared store.
pub struct ViewHandle {
    store: CourseStore,
    rx: watch::Receiver<CourseSnapshot>,
    guard: CancelGuard,
}

impl ViewHandle {
    pub fn new(store: &CourseStore) -> Self {
        Self {
            store: store.clone(),
            rx: store.subscribe(),
            guard: CancelToken::new().guard(),
        }
    }

    pub fn store(&self) -> &CourseStore {
        &self.store
    }

    pub fn cancel_token(&self) -> &CancelToken {
        self.guard.token()
    }

    pub async fn mount(&self) -> Result<usize, ApiError> {
        self.store.load_once(self.cancel_token()).await
    }

    pub async fn retry(&self) -> Result<usize, ApiError> {
        self.store.retry(self.cancel_token()).await
    }

    pub async fn refresh(&self) -> Result<usize, ApiError> {
        self.store.refresh_scoped(self.cancel_token()).await
    }

    pub fn snapshot(&self) -> CourseSnapshot {
        self.rx.borrow().clone()
    }

    pub fn state(&self) -> ViewState {
        ViewState::from_snapshot(&self.rx.borrow())
    }

    /// Wait for the next broadcast. `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    fn find_course(&self, id: i64) -> Option<Course> {
        self.rx.borrow().courses.iter().find(|c| c.id == id).cloned()
    }
}

/// A view's course collection together with its per-item management state:
/// delete confirmation, the row being deleted, the expanded row and the
/// course whose competencies are open.
pub struct CourseCollection {
    view: ViewHandle,
    confirmation: Confirmation,
    deleting: Option<i64>,
    expanded: Option<i64>,
    selected: Option<i64>,
    last_error: Option<String>,
}

impl CourseCollection {
    pub fn new(store: &CourseStore) -> Self {
        Self {
            view: ViewHandle::new(store),
            confirmation: Confirmation::default(),
            deleting: None,
            expanded: None,
            selected: None,
            last_error: None,
        }
    }

    pub fn view(&self) -> &ViewHandle {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewHandle {
        &mut self.view
    }

    pub async fn mount(&self) -> Result<usize, ApiError> {
        self.view.mount().await
    }

    pub async fn retry(&self) -> Result<usize, ApiError> {
        self.view.retry().await
    }

    pub fn state(&self) -> ViewState {
        self.view.state()
    }

    pub fn deleting(&self) -> Option<i64> {
        self.deleting
    }

    pub fn expanded(&self) -> Option<i64> {
        self.expanded
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn confirmation_prompt(&self) -> Option<String> {
        self.confirmation.prompt()
    }

    pub fn toggle_expanded(&mut self, id: i64) {
        self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
    }

    /// Collapse rows and close the competency editor, as on an outside click.
    pub fn dismiss(&mut self) {
        self.expanded = None;
        self.selected = None;
    }

    /// Open the competency editor for a course. Its requests share this
    /// view's cancellation scope.
    pub fn manage_competencies(&mut self, course_id: i64) -> CompetencyEditor {
        self.selected = Some(course_id);
        CompetencyEditor::new(
            self.view.store().clone(),
            self.view.cancel_token().clone(),
            course_id,
        )
    }

    pub fn close_competencies(&mut self) {
        self.selected = None;
    }

    /// Open the confirmation dialog. `false` if the course is not displayed.
    pub fn request_delete(&mut self, id: i64) -> bool {
        let Some(course) = self.view.find_course(id) else {
            return false;
        };
        self.confirmation.request(PendingAction::DeleteCourse {
            id,
            title: course.title,
        });
        true
    }

    pub fn cancel_delete(&mut self) {
        self.confirmation.cancel();
    }

    /// Run the confirmed deletion. `Ok(false)` when nothing was pending.
    pub async fn confirm_delete(&mut self) -> Result<bool, ApiError> {
        let Some(PendingAction::DeleteCourse { id, title }) = self.confirmation.confirm() else {
            return Ok(false);
        };

        self.deleting = Some(id);
        let result = self
            .view
            .store()
            .delete_course(id, self.view.cancel_token())
            .await;
        self.deleting = None;

        match result {
            Ok(()) => {
                info!("Subject \"{}\" deleted", title);
                self.last_error = None;
                if self.expanded == Some(id) {
                    self.expanded = None;
                }
                if self.selected == Some(id) {
                    self.selected = None;
                }
                Ok(true)
            }
            Err(e) => {
                error!("Error deleting course {}: {}", id, e);
                self.last_error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

/// Catches faults raised while building a render and holds them until reset.
/// Network errors never land here; they live in the snapshot.
#[derive(Debug, Default)]
pub struct ErrorBoundary {
    fault: Option<String>,
}

impl ErrorBoundary {
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn capture(&mut self, fault: impl Display) {
        error!("Rendering fault: {}", fault);
        self.fault = Some(fault.to_string());
    }

    pub fn reset(&mut self) {
        self.fault = None;
    }

    /// Run `render`, capturing a panic as a fault. Returns `None` while a
    /// fault is held.
    pub fn render<T>(&mut self, render: impl FnOnce() -> T) -> Option<T> {
        if self.fault.is_some() {
            return None;
        }
        match catch_unwind(AssertUnwindSafe(render)) {
            Ok(value) => Some(value),
            Err(payload) => {
                self.capture(panic_message(payload.as_ref()));
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "Something went wrong".to_string()
    }
}
