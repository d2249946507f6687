use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use super::{CoursesApi, RequestOptions};
use crate::error::ApiError;
use crate::models::{Competency, CompetencyRequest, Course, NewCourseRequest};

/// Backend held in memory, used by tests and local demos.
///
/// Assigns ids, cascades course deletion to its competencies, counts every
/// call by operation name and can be told to fail the next call.
#[derive(Debug, Default)]
pub struct InMemoryCoursesApi {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    courses: Vec<Course>,
    next_course_id: i64,
    next_competency_id: i64,
    calls: HashMap<&'static str, usize>,
    fail_next: Option<ApiError>,
    delay: Option<Duration>,
}

impl InMemoryCoursesApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_courses(courses: Vec<Course>) -> Self {
        let next_course_id = courses.iter().map(|c| c.id).max().unwrap_or(0);
        let next_competency_id = courses
            .iter()
            .flat_map(|c| c.competencies.iter().map(|comp| comp.id))
            .max()
            .unwrap_or(0);

        Self {
            state: Mutex::new(MemoryState {
                courses,
                next_course_id,
                next_competency_id,
                ..MemoryState::default()
            }),
        }
    }

    /// Make the next call of any kind fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.lock().fail_next = Some(error);
    }

    /// Delay every call, so callers can observe in-flight state.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.lock().delay = delay;
    }

    pub fn call_count(&self, op: &str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.lock().calls.values().sum()
    }

    /// Current contents of the backend, bypassing the call counters.
    pub fn courses(&self) -> Vec<Course> {
        self.lock().courses.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn begin(&self, op: &'static str) -> Result<(), ApiError> {
        let (delay, failure) = {
            let mut state = self.lock();
            *state.calls.entry(op).or_insert(0) += 1;
            (state.delay, state.fail_next.take())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CoursesApi for InMemoryCoursesApi {
    async fn list_courses(&self, _opts: &RequestOptions) -> Result<Vec<Course>, ApiError> {
        self.begin("list_courses").await?;
        Ok(self.lock().courses.clone())
    }

    async fn get_course(&self, id: i64) -> Result<Course, ApiError> {
        self.begin("get_course").await?;
        self.lock()
            .courses
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, ApiError> {
        self.begin("create_course").await?;
        let mut state = self.lock();
        state.next_course_id += 1;
        let course = Course {
            id: state.next_course_id,
            title: req.title.clone(),
            credits: req.credits,
            competencies: Vec::new(),
        };
        state.courses.push(course.clone());
        Ok(course)
    }

    async fn delete_course(&self, id: i64) -> Result<(), ApiError> {
        self.begin("delete_course").await?;
        let mut state = self.lock();
        let before = state.courses.len();
        state.courses.retain(|c| c.id != id);
        if state.courses.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }

    async fn list_competencies(&self, course_id: i64) -> Result<Vec<Competency>, ApiError> {
        self.begin("list_competencies").await?;
        self.lock()
            .courses
            .iter()
            .find(|c| c.id == course_id)
            .map(|c| c.competencies.clone())
            .ok_or(ApiError::NotFound)
    }

    async fn create_competency(
        &self,
        course_id: i64,
        req: &CompetencyRequest,
    ) -> Result<Competency, ApiError> {
        self.begin("create_competency").await?;
        let mut state = self.lock();
        let id = state.next_competency_id + 1;
        let course = state
            .courses
            .iter_mut()
            .find(|c| c.id == course_id)
            .ok_or(ApiError::NotFound)?;

        let competency = Competency {
            id,
            name: req.name.clone(),
            marks: req.marks,
        };
        course.competencies.push(competency.clone());
        state.next_competency_id = id;
        Ok(competency)
    }

    async fn update_competency(
        &self,
        id: i64,
        req: &CompetencyRequest,
    ) -> Result<Competency, ApiError> {
        self.begin("update_competency").await?;
        let mut state = self.lock();
        let competency = state
            .courses
            .iter_mut()
            .flat_map(|c| c.competencies.iter_mut())
            .find(|comp| comp.id == id)
            .ok_or(ApiError::NotFound)?;

        competency.name = req.name.clone();
        competency.marks = req.marks;
        Ok(competency.clone())
    }

    async fn delete_competency(&self, id: i64) -> Result<(), ApiError> {
        self.begin("delete_competency").await?;
        let mut state = self.lock();
        for course in state.courses.iter_mut() {
            if let Some(pos) = course.competencies.iter().position(|comp| comp.id == id) {
                course.competencies.remove(pos);
                return Ok(());
            }
        }
        Err(ApiError::NotFound)
    }
}
