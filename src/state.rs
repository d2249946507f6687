use std::sync::Arc;

use crate::gateway::CoursesApi;
use crate::services::CourseStore;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn CoursesApi>,
    pub store: CourseStore,
}
