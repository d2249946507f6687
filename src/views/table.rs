use serde::Serialize;

use super::CourseCollection;
use crate::models::Course;
use crate::services::CourseStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: i64,
    pub title: String,
    pub credits: i32,
    pub competency_count: usize,
    pub expanded: bool,
    /// `"name (marks)"` for each competency, only for the expanded row.
    pub details: Vec<String>,
    pub deleting: bool,
}

/// Courses as a table, one row per course.
pub struct TableView {
    collection: CourseCollection,
}

impl TableView {
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

    pub fn summary(&self) -> String {
        format!("{} subjects in total", self.collection.state().courses().len())
    }

    pub fn rows(&self) -> Vec<TableRow> {
        self.collection
            .state()
            .courses()
            .iter()
            .map(|course| self.row(course))
            .collect()
    }

    fn row(&self, course: &Course) -> TableRow {
        let expanded = self.collection.expanded() == Some(course.id);
        TableRow {
            id: course.id,
            title: course.title.clone(),
            credits: course.credits,
            competency_count: course.competency_count(),
            expanded,
            details: if expanded {
                course
                    .competencies
                    .iter()
                    .map(|c| format!("{} ({})", c.name, c.marks))
                    .collect()
            } else {
                Vec::new()
            },
            deleting: self.collection.deleting() == Some(course.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::events::MemoryEventLogger;
    use crate::gateway::InMemoryCoursesApi;
    use crate::models::Competency;

    #[tokio::test]
    async fn test_expanded_row_lists_marks() {
        let api = Arc::new(InMemoryCoursesApi::with_courses(vec![Course {
            id: 2,
            title: "Data Structures".to_string(),
            credits: 8,
            competencies: vec![
                Competency { id: 1, name: "Arrays".to_string(), marks: 7 },
                Competency { id: 2, name: "Trees".to_string(), marks: 9 },
            ],
        }]));
        let store = CourseStore::with_default_timeout(api, Arc::new(MemoryEventLogger::new()));
        let mut table = TableView::new(&store);
        table.collection().mount().await.expect("mount");

        assert_eq!(table.summary(), "1 subjects in total");
        assert!(table.rows()[0].details.is_empty());

        table.collection_mut().toggle_expanded(2);
        let rows = table.rows();
        let row = &rows[0];
        assert!(row.expanded);
        assert_eq!(row.details, vec!["Arrays (7)", "Trees (9)"]);
        assert_eq!(row.competency_count, 2);
    }
}
