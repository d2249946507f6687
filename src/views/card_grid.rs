use serde::Serialize;

use super::CourseCollection;
use crate::models::Course;
use crate::services::CourseStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCard {
    pub id: i64,
    pub title: String,
    pub credits: i32,
    pub competency_count: usize,
    pub competency_names: Vec<String>,
    pub deleting: bool,
}

impl CourseCard {
    pub fn new(course: &Course, deleting: bool) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            credits: course.credits,
            competency_count: course.competency_count(),
            competency_names: course.competencies.iter().map(|c| c.name.clone()).collect(),
            deleting,
        }
    }
}

/// Courses as a grid of cards.
pub struct CardGrid {
    collection: CourseCollection,
}

impl CardGrid {
    pub fn new(store: &CourseStore) -> Self {
        Self {
            collection: CourseCollection::new(store),
        }
    }

    pub fn collection(&self) -> &CourseCollection {
        &self.collection
    }

    pub fn collection_mut(&mut self) -> &mut CourseCollection {
        &mut self.collection
    }

    pub fn cards(&self) -> Vec<CourseCard> {
        let deleting = self.collection.deleting();
        self.collection
            .state()
            .courses()
            .iter()
            .map(|course| CourseCard::new(course, deleting == Some(course.id)))
            .collect()
    }
}
