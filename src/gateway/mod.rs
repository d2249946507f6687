pub mod cancel;
pub mod client;
pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{Competency, CompetencyRequest, Course, NewCourseRequest};

pub use cancel::{CancelGuard, CancelToken};
pub use client::{ApiClient, RequestOptions};
pub use memory::InMemoryCoursesApi;

/// The backend's courses resource family.
#[async_trait]
pub trait CoursesApi: Send + Sync {
    async fn list_courses(&self, opts: &RequestOptions) -> Result<Vec<Course>, ApiError>;
    async fn get_course(&self, id: i64) -> Result<Course, ApiError>;
    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, ApiError>;
    async fn delete_course(&self, id: i64) -> Result<(), ApiError>;
    async fn list_competencies(&self, course_id: i64) -> Result<Vec<Competency>, ApiError>;
    async fn create_competency(
        &self,
        course_id: i64,
        req: &CompetencyRequest,
    ) -> Result<Competency, ApiError>;
    async fn update_competency(
        &self,
        id: i64,
        req: &CompetencyRequest,
    ) -> Result<Competency, ApiError>;
    async fn delete_competency(&self, id: i64) -> Result<(), ApiError>;
}

pub struct HttpCoursesApi {
    client: ApiClient,
}

impl HttpCoursesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn from_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::new(base_url)?))
    }

    async fn get_collection<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: &RequestOptions,
    ) -> Result<Vec<T>, ApiError> {
        let value: Value = self.client.get(path, opts).await?;
        if !value.is_array() {
            return Err(ApiError::MalformedResponse(format!(
                "expected an array from {}",
                path
            )));
        }
        serde_json::from_value(value).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl CoursesApi for HttpCoursesApi {
    async fn list_courses(&self, opts: &RequestOptions) -> Result<Vec<Course>, ApiError> {
        self.get_collection("/courses", opts).await
    }

    async fn get_course(&self, id: i64) -> Result<Course, ApiError> {
        self.client
            .get(&format!("/courses/{}", id), &RequestOptions::default())
            .await
    }

    async fn create_course(&self, req: &NewCourseRequest) -> Result<Course, ApiError> {
        self.client
            .post("/courses", req, &RequestOptions::default())
            .await
    }

    async fn delete_course(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/courses/{}", id), &RequestOptions::default())
            .await
    }

    async fn list_competencies(&self, course_id: i64) -> Result<Vec<Competency>, ApiError> {
        self.get_collection(
            &format!("/courses/{}/competencies", course_id),
            &RequestOptions::default(),
        )
        .await
    }

    async fn create_competency(
        &self,
        course_id: i64,
        req: &CompetencyRequest,
    ) -> Result<Competency, ApiError> {
        self.client
            .post(
                &format!("/courses/{}/competencies", course_id),
                req,
                &RequestOptions::default(),
            )
            .await
    }

    // Update and delete address the competency directly, not under its course.
    async fn update_competency(
        &self,
        id: i64,
        req: &CompetencyRequest,
    ) -> Result<Competency, ApiError> {
        self.client
            .put(
                &format!("/courses/competencies/{}", id),
                req,
                &RequestOptions::default(),
            )
            .await
    }

    async fn delete_competency(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(
                &format!("/courses/competencies/{}", id),
                &RequestOptions::default(),
            )
            .await
    }
}
