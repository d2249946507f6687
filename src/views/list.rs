use serde::Serialize;

use super::CourseCollection;
use crate::models::{Competency, Course};
use crate::services::CourseStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub id: i64,
    pub title: String,
    pub credits: i32,
    pub competency_count: usize,
    pub expanded: bool,
    /// Filled only for the expanded item.
    pub competencies: Vec<Competency>,
    pub deleting: bool,
}

/// Courses as a vertical list with expandable items.
pub struct ListView {
    collection: CourseCollection,
}

impl ListView {
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

    pub fn items(&self) -> Vec<ListItem> {
        self.collection
            .state()
            .courses()
            .iter()
            .map(|course| self.item(course))
            .collect()
    }

    fn item(&self, course: &Course) -> ListItem {
        let expanded = self.collection.expanded() == Some(course.id);
        ListItem {
            id: course.id,
            title: course.title.clone(),
            credits: course.credits,
            competency_count: course.competency_count(),
            expanded,
            competencies: if expanded {
                course.competencies.clone()
            } else {
                Vec::new()
            },
            deleting: self.collection.deleting() == Some(course.id),
        }
    }
}
