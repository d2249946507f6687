use serde::Serialize;

use super::{CardGrid, CourseCard, ErrorBoundary, ViewState};
use crate::error::ApiError;
use crate::models::Course;
use crate::services::{CourseForm, CourseStore};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_courses: usize,
    pub total_competencies: usize,
    /// Rounded to two decimals; zero when there are no competencies.
    pub avg_marks_per_competency: f64,
}

impl DashboardStats {
    pub fn from_courses(courses: &[Course]) -> Self {
        let total_competencies: usize = courses.iter().map(Course::competency_count).sum();
        let total_marks: i64 = courses.iter().map(Course::total_marks).sum();

        let avg_marks_per_competency = if total_competencies > 0 {
            let avg = total_marks as f64 / total_competencies as f64;
            (avg * 100.0).round() / 100.0
        } else {
            0.0
        };

        Self {
            total_courses: courses.len(),
            total_competencies,
            avg_marks_per_competency,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardRender {
    pub view: ViewState,
    pub stats: DashboardStats,
    pub cards: Vec<CourseCard>,
    pub notice: Option<String>,
}

/// Stats header, card grid and the create-course form.
pub struct Dashboard {
    grid: CardGrid,
    form: Option<CourseForm>,
    boundary: ErrorBoundary,
}

impl Dashboard {
    pub fn new(store: &CourseStore) -> Self {
        Self {
            grid: CardGrid::new(store),
            form: None,
            boundary: ErrorBoundary::default(),
        }
    }

    pub fn grid(&self) -> &CardGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut CardGrid {
        &mut self.grid
    }

    pub async fn mount(&self) -> Result<usize, ApiError> {
        self.grid.collection().mount().await
    }

    pub async fn retry(&self) -> Result<usize, ApiError> {
        self.grid.collection().retry().await
    }

    pub fn state(&self) -> ViewState {
        self.grid.collection().state()
    }

    /// Computed from the courses currently held, never fetched separately.
    pub fn stats(&self) -> DashboardStats {
        DashboardStats::from_courses(&self.grid.collection().view().snapshot().courses)
    }

    pub fn open_form(&mut self) -> &mut CourseForm {
        let view = self.grid.collection().view();
        self.form.get_or_insert_with(|| {
            CourseForm::new(view.store().clone(), view.cancel_token().clone())
        })
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn form(&self) -> Option<&CourseForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut CourseForm> {
        self.form.as_mut()
    }

    /// Submit the open form; closes it on success.
    pub async fn submit_form(&mut self) -> Result<Option<Course>, ApiError> {
        let Some(form) = self.form.as_mut() else {
            return Ok(None);
        };
        let course = form.submit().await?;
        self.form = None;
        Ok(Some(course))
    }

    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }

    pub fn reset_boundary(&mut self) {
        self.boundary.reset();
    }

    /// Everything needed to draw the dashboard, or `None` while a rendering
    /// fault is held by the boundary.
    pub fn render(&mut self) -> Option<DashboardRender> {
        let grid = &self.grid;
        self.boundary.render(|| {
            let snapshot = grid.collection().view().snapshot();
            DashboardRender {
                view: grid.collection().state(),
                stats: DashboardStats::from_courses(&snapshot.courses),
                cards: grid.cards(),
                notice: snapshot.notice,
            }
        })
    }
}
