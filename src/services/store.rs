use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_FETCH_TIMEOUT;
use crate::error::ApiError;
use crate::events::EventLogger;
use crate::gateway::{CancelToken, CoursesApi, RequestOptions};
use crate::models::Course;

/// What every subscribed view renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseSnapshot {
    pub courses: Vec<Course>,
    pub loading: bool,
    pub error: Option<ApiError>,
    pub retry_count: u32,
    /// At least one fetch has succeeded.
    pub loaded: bool,
    /// Bumped on every successful fetch.
    pub version: u64,
    pub notice: Option<String>,
}

impl CourseSnapshot {
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ApiError::user_message)
    }
}

/// Course collection shared by all views.
///
/// The collection is only ever replaced wholesale by a fetch; mutations go to
/// the backend and are followed by a refresh. Snapshots are broadcast to every
/// subscriber through a watch channel.
#[derive(Clone)]
pub struct CourseStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    api: Arc<dyn CoursesApi>,
    events: Arc<dyn EventLogger>,
    tx: watch::Sender<CourseSnapshot>,
    fetch_lock: Mutex<()>,
    fetch_timeout: Duration,
    cancel: CancelToken,
}

impl CourseStore {
    pub fn new(
        api: Arc<dyn CoursesApi>,
        events: Arc<dyn EventLogger>,
        fetch_timeout: Duration,
    ) -> Self {
        let (tx, _rx) = watch::channel(CourseSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                api,
                events,
                tx,
                fetch_lock: Mutex::new(()),
                fetch_timeout,
                cancel: CancelToken::new(),
            }),
        }
    }

    pub fn with_default_timeout(api: Arc<dyn CoursesApi>, events: Arc<dyn EventLogger>) -> Self {
        Self::new(api, events, DEFAULT_FETCH_TIMEOUT)
    }

    pub fn api(&self) -> &Arc<dyn CoursesApi> {
        &self.inner.api
    }

    pub fn events(&self) -> &Arc<dyn EventLogger> {
        &self.inner.events
    }

    pub fn subscribe(&self) -> watch::Receiver<CourseSnapshot> {
        self.inner.tx.subscribe()
    }

    pub fn snapshot(&self) -> CourseSnapshot {
        self.inner.tx.borrow().clone()
    }

    /// Replace the collection with the backend's current list.
    pub async fn fetch(&self) -> Result<usize, ApiError> {
        let _guard = self.inner.fetch_lock.lock().await;
        self.fetch_locked(None).await
    }

    /// Same as [`fetch`](Self::fetch), also aborted when `scope` is cancelled.
    pub async fn fetch_scoped(&self, scope: &CancelToken) -> Result<usize, ApiError> {
        let _guard = self.inner.fetch_lock.lock().await;
        self.fetch_locked(Some(scope)).await
    }

    pub async fn refresh(&self) -> Result<usize, ApiError> {
        self.fetch().await
    }

    pub async fn refresh_scoped(&self, scope: &CancelToken) -> Result<usize, ApiError> {
        self.fetch_scoped(scope).await
    }

    /// Initial fetch for a mounting view. Only the first caller hits the
    /// backend; later callers reuse the loaded snapshot.
    pub async fn load_once(&self, scope: &CancelToken) -> Result<usize, ApiError> {
        let _guard = self.inner.fetch_lock.lock().await;
        let loaded = {
            let snapshot = self.inner.tx.borrow();
            snapshot.loaded.then(|| snapshot.courses.len())
        };
        match loaded {
            Some(count) => Ok(count),
            None => self.fetch_locked(Some(scope)).await,
        }
    }

    /// User-triggered retry after a failed fetch.
    pub async fn retry(&self, scope: &CancelToken) -> Result<usize, ApiError> {
        let retry_count = self.inner.tx.borrow().retry_count;
        self.inner
            .events
            .log_event("retry_clicked", json!({ "retryCount": retry_count }));
        self.fetch_scoped(scope).await
    }

    /// Delete a course, then refresh. The caller is responsible for having
    /// obtained confirmation.
    pub async fn delete_course(&self, id: i64, scope: &CancelToken) -> Result<(), ApiError> {
        self.inner
            .cancel
            .run(scope.run(self.inner.api.delete_course(id)))
            .await
            .inspect_err(|e| warn!("Error deleting course {}: {}", id, e))?;

        self.inner
            .events
            .log_event("course_deleted", json!({ "id": id }));
        info!("Deleted course {}", id);

        if let Err(e) = self.refresh_scoped(scope).await {
            debug!("Refresh after deleting course {} failed: {}", id, e);
        }
        Ok(())
    }

    /// Abort in-flight store requests and refuse new ones.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    async fn fetch_locked(&self, scope: Option<&CancelToken>) -> Result<usize, ApiError> {
        let (retry_count, prior_error, prior_notice) = {
            let s = self.inner.tx.borrow();
            (s.retry_count, s.error.clone(), s.notice.clone())
        };
        self.inner.tx.send_modify(|s| {
            s.loading = true;
            s.error = None;
            s.notice = None;
        });
        self.inner
            .events
            .log_event("courses_fetch_started", json!({ "retryCount": retry_count }));

        let opts = RequestOptions::no_cache().with_timeout(self.inner.fetch_timeout);
        let request = self.inner.api.list_courses(&opts);
        let result = match scope {
            Some(token) => self.inner.cancel.run(token.run(request)).await,
            None => self.inner.cancel.run(request).await,
        };

        match result {
            Ok(courses) => {
                let count = courses.len();
                self.inner.tx.send_modify(|s| {
                    s.courses = courses;
                    s.loading = false;
                    s.error = None;
                    s.retry_count = 0;
                    s.loaded = true;
                    s.version += 1;
                    s.notice = (count > 0).then(|| {
                        format!("Loaded {} course{}", count, if count == 1 { "" } else { "s" })
                    });
                });
                self.inner.events.log_event(
                    "courses_fetch_success",
                    json!({ "courseCount": count }),
                );
                info!("Fetched {} courses", count);
                Ok(count)
            }
            Err(ApiError::Cancelled) => {
                // A cancelled fetch leaves the previous outcome in place.
                self.inner.tx.send_modify(|s| {
                    s.loading = false;
                    s.error = prior_error;
                    s.notice = prior_notice;
                });
                debug!("Course fetch cancelled");
                Err(ApiError::Cancelled)
            }
            Err(e) => {
                let message = e.user_message();
                self.inner.tx.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.clone());
                    s.retry_count += 1;
                    // Stale data stays visible once something has been shown.
                    if !s.loaded {
                        s.courses.clear();
                    }
                });
                self.inner.events.log_event(
                    "courses_fetch_error",
                    json!({ "error": message, "retryCount": retry_count + 1 }),
                );
                warn!("Failed to fetch courses: {}", e);
                Err(e)
            }
        }
    }
}
