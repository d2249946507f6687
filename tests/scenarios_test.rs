use std::sync::Arc;
use std::time::Duration;

use evalpro::error::{ApiError, ValidationError};
use evalpro::events::MemoryEventLogger;
use evalpro::gateway::{CoursesApi, InMemoryCoursesApi};
use evalpro::services::{CourseStore, EditorState};
use evalpro::views::{Dashboard, ListView, TableView, ViewState};

fn setup() -> (Arc<InMemoryCoursesApi>, Arc<MemoryEventLogger>, CourseStore) {
    let api = Arc::new(InMemoryCoursesApi::new());
    let events = Arc::new(MemoryEventLogger::new());
    let store = CourseStore::with_default_timeout(api.clone(), events.clone());
    (api, events, store)
}

#[tokio::test]
async fn test_create_course_and_competency_updates_dashboard() {
    let (api, events, store) = setup();
    let mut dashboard = Dashboard::new(&store);
    dashboard.mount().await.expect("mount");
    assert_eq!(dashboard.state(), ViewState::Empty);

    let form = dashboard.open_form();
    form.set_title("Data Structures");
    form.set_credits("8");
    let course = dashboard
        .submit_form()
        .await
        .expect("create course")
        .expect("form was open");
    assert!(dashboard.form().is_none());
    assert_eq!(course.title, "Data Structures");
    assert_eq!(course.credits, 8);

    let mut editor = dashboard
        .grid_mut()
        .collection_mut()
        .manage_competencies(course.id);
    editor.open().await;
    assert_eq!(editor.course_title(), "Data Structures");

    editor.begin_create();
    editor.set_name("Arrays");
    editor.set_marks("7");
    let competency = editor.submit().await.expect("add competency");
    assert_eq!(competency.marks, 7);
    assert_eq!(editor.state(), EditorState::Idle);
    assert_eq!(editor.competencies(), &[competency.clone()]);

    let stats = dashboard.stats();
    assert_eq!(stats.total_courses, 1);
    assert_eq!(stats.total_competencies, 1);
    assert_eq!(stats.avg_marks_per_competency, 7.0);

    assert_eq!(api.call_count("create_course"), 1);
    assert_eq!(api.call_count("create_competency"), 1);
    assert_eq!(events.count("course_created"), 1);
    assert_eq!(events.count("competency_added"), 1);
}

#[tokio::test]
async fn test_out_of_range_marks_never_reach_backend() {
    let (api, _events, store) = setup();
    let course = api
        .create_course(&evalpro::models::NewCourseRequest {
            title: "Cloud Computing".to_string(),
            credits: 6,
        })
        .await
        .expect("seed course");

    let mut list = ListView::new(&store);
    list.collection().mount().await.expect("mount");
    let mut editor = list.collection_mut().manage_competencies(course.id);
    editor.open().await;
    let calls = api.total_calls();

    editor.begin_create();
    editor.set_name("Containers");
    editor.set_marks("11");
    let err = editor.submit().await.expect_err("marks out of range");

    assert!(matches!(
        err,
        ApiError::Validation(ValidationError::OutOfRange { value: 11, .. })
    ));
    assert_eq!(editor.error(), Some("marks must be between 0 and 10, got 11"));
    assert_eq!(editor.state(), EditorState::Editing(None));
    assert_eq!(api.total_calls(), calls);
}

#[tokio::test]
async fn test_edits_target_server_assigned_ids() {
    let (api, _events, store) = setup();
    let mut dashboard = Dashboard::new(&store);
    dashboard.mount().await.expect("mount");

    let form = dashboard.open_form();
    form.set_title("Operating Systems");
    form.set_credits("5");
    let course = dashboard.submit_form().await.expect("create").expect("open form");

    let mut editor = dashboard
        .grid_mut()
        .collection_mut()
        .manage_competencies(course.id);
    editor.open().await;
    editor.begin_create();
    editor.set_name("Scheduling");
    editor.set_marks("4");
    let created = editor.submit().await.expect("create competency");

    assert!(editor.begin_edit(created.id));
    editor.set_marks("9");
    let updated = editor.submit().await.expect("update competency");

    assert_eq!(updated.id, created.id);
    assert_eq!(api.call_count("update_competency"), 1);
    assert_eq!(api.courses()[0].competencies[0].marks, 9);
    assert_eq!(dashboard.stats().avg_marks_per_competency, 9.0);
}

#[tokio::test]
async fn test_views_share_one_collection() {
    let (api, _events, store) = setup();
    for title in ["Compilers", "Databases"] {
        api.create_course(&evalpro::models::NewCourseRequest {
            title: title.to_string(),
            credits: 4,
        })
        .await
        .expect("seed");
    }

    let dashboard = Dashboard::new(&store);
    let mut list = ListView::new(&store);
    let table = TableView::new(&store);
    let (a, b, c) = tokio::join!(
        dashboard.mount(),
        list.collection().mount(),
        table.collection().mount()
    );
    assert_eq!((a, b, c), (Ok(2), Ok(2), Ok(2)));
    assert_eq!(api.call_count("list_courses"), 1);

    // A deletion from one view shows up in the others without another mount.
    assert!(list.collection_mut().request_delete(1));
    assert_eq!(list.collection().confirmation_prompt().as_deref(), Some("Delete Compilers?"));
    assert_eq!(list.collection_mut().confirm_delete().await, Ok(true));

    assert_eq!(table.summary(), "1 subjects in total");
    assert_eq!(dashboard.stats().total_courses, 1);
    assert_eq!(list.items()[0].title, "Databases");
}

#[tokio::test]
async fn test_refresh_is_idempotent_after_mutation() {
    let (api, _events, store) = setup();
    let table = TableView::new(&store);
    table.collection().mount().await.expect("mount");

    api.create_course(&evalpro::models::NewCourseRequest {
        title: "Networks".to_string(),
        credits: 7,
    })
    .await
    .expect("create");

    table.collection().view().refresh().await.expect("first refresh");
    let first = table.rows();
    table.collection().view().refresh().await.expect("second refresh");

    assert_eq!(table.rows(), first);
    assert_eq!(store.snapshot().courses, api.courses());
}

#[tokio::test]
async fn test_deleted_course_competencies_are_gone() {
    let (api, _events, store) = setup();
    let mut table = TableView::new(&store);
    table.collection().mount().await.expect("mount");

    let course = api
        .create_course(&evalpro::models::NewCourseRequest {
            title: "Graphics".to_string(),
            credits: 3,
        })
        .await
        .expect("create");
    table.collection().view().refresh().await.expect("refresh");

    let mut editor = table.collection_mut().manage_competencies(course.id);
    editor.open().await;
    editor.begin_create();
    editor.set_name("Shaders");
    editor.set_marks("6");
    editor.submit().await.expect("add competency");

    table.collection_mut().request_delete(course.id);
    table.collection_mut().confirm_delete().await.expect("delete");

    assert_eq!(table.collection().state(), ViewState::Empty);
    assert_eq!(table.collection().selected(), None);

    editor.reload_competencies().await;
    assert_eq!(editor.error(), Some("Failed to fetch competencies"));
    assert_eq!(api.list_competencies(course.id).await, Err(ApiError::NotFound));
}

#[tokio::test]
async fn test_declined_competency_delete_issues_no_calls() {
    let (api, _events, store) = setup();
    let course = api
        .create_course(&evalpro::models::NewCourseRequest {
            title: "Algorithms".to_string(),
            credits: 9,
        })
        .await
        .expect("create");
    let mut list = ListView::new(&store);
    list.collection().mount().await.expect("mount");

    let mut editor = list.collection_mut().manage_competencies(course.id);
    editor.open().await;
    editor.begin_create();
    editor.set_name("Sorting");
    editor.set_marks("8");
    let competency = editor.submit().await.expect("add competency");
    let calls = api.total_calls();

    assert!(editor.request_delete(competency.id));
    assert_eq!(
        editor.confirmation_prompt().as_deref(),
        Some("Delete competency Sorting?")
    );
    editor.cancel_delete();
    assert_eq!(editor.confirm_delete().await, Ok(false));

    assert_eq!(api.total_calls(), calls);
    assert_eq!(api.courses()[0].competencies.len(), 1);
}

#[tokio::test]
async fn test_stale_courses_stay_visible_after_failure() {
    let (api, _events, store) = setup();
    api.create_course(&evalpro::models::NewCourseRequest {
        title: "Security".to_string(),
        credits: 5,
    })
    .await
    .expect("create");
    let dashboard = Dashboard::new(&store);
    dashboard.mount().await.expect("mount");

    api.fail_next(ApiError::Timeout);
    dashboard
        .grid()
        .collection()
        .view()
        .refresh()
        .await
        .expect_err("refresh fails");

    match dashboard.state() {
        ViewState::Failed {
            message,
            retry_count,
            stale,
        } => {
            assert_eq!(
                message,
                "Request timeout. Please check your connection and try again."
            );
            assert_eq!(retry_count, 1);
            assert_eq!(stale.len(), 1);
        }
        other => panic!("expected failed state, got {:?}", other),
    }
    assert_eq!(dashboard.grid().cards().len(), 1);

    dashboard.retry().await.expect("retry succeeds");
    assert!(matches!(dashboard.state(), ViewState::Ready { .. }));
}

#[tokio::test]
async fn test_dropping_view_cancels_in_flight_fetch() {
    let (api, _events, store) = setup();
    api.set_delay(Some(Duration::from_millis(500)));

    let dashboard = Dashboard::new(&store);
    let token = dashboard.grid().collection().view().cancel_token().clone();
    let fetching = store.clone();
    let task = tokio::spawn(async move { fetching.fetch_scoped(&token).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(store.snapshot().loading);
    drop(dashboard);

    let result = task.await.expect("fetch task panicked");
    assert_eq!(result, Err(ApiError::Cancelled));

    let snapshot = store.snapshot();
    assert!(!snapshot.loading);
    assert_eq!(snapshot.error, None);
    assert!(!snapshot.loaded);
}

#[tokio::test]
async fn test_closing_view_mid_retry_keeps_failure_banner() {
    let (api, _events, store) = setup();
    let dashboard = Dashboard::new(&store);
    api.fail_next(ApiError::Server);
    dashboard.mount().await.expect_err("first load fails");

    api.set_delay(Some(Duration::from_millis(500)));
    let closing = Dashboard::new(&store);
    let token = closing.grid().collection().view().cancel_token().clone();
    let retrying = store.clone();
    let task = tokio::spawn(async move { retrying.retry(&token).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(dashboard.state(), ViewState::Loading);
    drop(closing);
    assert_eq!(task.await.expect("retry task panicked"), Err(ApiError::Cancelled));

    match dashboard.state() {
        ViewState::Failed {
            message,
            retry_count,
            stale,
        } => {
            assert_eq!(message, "Server error. Please try again later.");
            assert_eq!(retry_count, 1);
            assert!(stale.is_empty());
        }
        other => panic!("expected failed state, got {:?}", other),
    }
}

#[tokio::test]
async fn test_view_is_notified_of_changes() {
    let (api, _events, store) = setup();
    let mut list = ListView::new(&store);

    store.refresh().await.expect("initial fetch");
    assert!(list.collection_mut().view_mut().changed().await);

    api.create_course(&evalpro::models::NewCourseRequest {
        title: "Robotics".to_string(),
        credits: 2,
    })
    .await
    .expect("create");
    store.refresh().await.expect("refresh");

    assert!(list.collection_mut().view_mut().changed().await);
    assert_eq!(list.items().len(), 1);
}
