//! The in-memory catalog of courses and students.
//!
//! The [`Catalog`] knows nothing about the filesystem. It holds the entities
//! produced by the loaders and answers lookups by key.

use std::sync::Arc;

use petgraph::{algo::tarjan_scc, graphmap::DiGraphMap};

use crate::domain::{Course, CourseCode, KeyedSet, PersonId, Student};

/// Courses and students known to the university.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    courses: KeyedSet<Arc<Course>>,
    students: KeyedSet<Arc<Student>>,
}

impl Catalog {
    /// Builds a catalog, dropping courses and students with repeated keys.
    #[must_use]
    pub fn new(
        courses: impl IntoIterator<Item = Course>,
        students: impl IntoIterator<Item = Student>,
    ) -> Self {
        Self {
            courses: courses.into_iter().map(Arc::new).collect(),
            students: students.into_iter().map(Arc::new).collect(),
        }
    }

    /// Looks up a course by code.
    #[must_use]
    pub fn course(&self, code: &CourseCode) -> Option<&Arc<Course>> {
        self.courses.get(code)
    }

    /// Looks up a student by id.
    #[must_use]
    pub fn student(&self, id: &PersonId) -> Option<&Arc<Student>> {
        self.students.get(id)
    }

    /// All courses, in load order.
    #[must_use]
    pub fn courses(&self) -> &[Arc<Course>] {
        self.courses.as_slice()
    }

    /// All students, in load order.
    #[must_use]
    pub fn students(&self) -> &[Arc<Student>] {
        self.students.as_slice()
    }

    /// Finds groups of courses whose prerequisites form a cycle.
    ///
    /// A course listing itself as a prerequisite is reported as a group of
    /// one. Prerequisites naming courses outside the catalog are ignored.
    /// Cycles are permitted in the catalog (no student can ever satisfy them,
    /// but they do not prevent loading), so this is a diagnostic only.
    #[must_use]
    pub fn prerequisite_cycles(&self) -> Vec<Vec<CourseCode>> {
        let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
        let mut self_loops = Vec::new();

        for (index, course) in self.courses.iter().enumerate() {
            graph.add_node(index);
            for prerequisite in course.prerequisites() {
                let Some(target) = self.courses.position(prerequisite) else {
                    continue;
                };
                if target == index {
                    self_loops.push(index);
                }
                graph.add_edge(index, target, ());
            }
        }

        let mut cycles: Vec<Vec<usize>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|component| component.len() > 1 || self_loops.contains(&component[0]))
            .collect();
        for component in &mut cycles {
            component.sort_unstable();
        }
        cycles.sort();

        cycles
            .into_iter()
            .map(|component| {
                component
                    .into_iter()
                    .map(|i| self.courses.as_slice()[i].code().clone())
                    .collect()
            })
            .collect()
    }
}
