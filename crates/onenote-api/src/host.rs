//! Interfaces to the host LMS.
//!
//! The course/enrollment/grading data model belongs to the host; this module
//! defines the narrow traits the notebook client consumes, plus in-memory
//! implementations used by tests and by hosts that stage data per request.

use std::collections::HashMap;

use crate::types::PageKind;

/// A course the user is enrolled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRef {
    pub id: u64,
    /// Full display name; becomes the section title in the notebook.
    pub full_name: String,
}

/// An assignment activity instance resolved from a context id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRef {
    pub context_id: u64,
    pub name: String,
    pub course: CourseRef,
}

/// Read-only view of the host's enrollment and assignment records.
pub trait HostDirectory {
    /// Resolves an assignment activity from its context id.
    fn assignment(&self, context_id: u64) -> Option<AssignmentRef>;

    /// Courses the given user is enrolled in.
    fn enrolled_courses(&self, user_id: u64) -> Vec<CourseRef>;

    /// Display name for a user, used in page titles.
    fn user_full_name(&self, user_id: u64) -> Option<String>;
}

/// A remote page already created for one submission or feedback record.
///
/// At most one reference exists per `(context_id, kind, record_id)`; the
/// store enforces the idempotence invariant the remote service cannot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReference {
    pub context_id: u64,
    pub kind: PageKind,
    /// Submission id for submission pages, grade id for feedback pages.
    pub record_id: u64,
    /// Remote id of the created page.
    pub page_id: String,
    /// Web URL of the page, returned to the host unchanged on every hit.
    pub url: String,
}

/// Persistence for [`PageReference`]s, normally backed by a host DB table.
pub trait PageReferenceStore {
    fn find(&self, context_id: u64, kind: PageKind, record_id: u64) -> Option<PageReference>;

    /// Inserts or overwrites the reference for its key.
    fn save(&mut self, reference: PageReference);
}

/// In-memory [`HostDirectory`] for tests and per-request staging.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    assignments: HashMap<u64, AssignmentRef>,
    enrollments: HashMap<u64, Vec<CourseRef>>,
    user_names: HashMap<u64, String>,
}

impl MemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_assignment(&mut self, assignment: AssignmentRef) {
        self.assignments.insert(assignment.context_id, assignment);
    }

    pub fn enrol(&mut self, user_id: u64, course: CourseRef) {
        self.enrollments.entry(user_id).or_default().push(course);
    }

    pub fn add_user(&mut self, user_id: u64, full_name: impl Into<String>) {
        self.user_names.insert(user_id, full_name.into());
    }
}

impl HostDirectory for MemoryDirectory {
    fn assignment(&self, context_id: u64) -> Option<AssignmentRef> {
        self.assignments.get(&context_id).cloned()
    }

    fn enrolled_courses(&self, user_id: u64) -> Vec<CourseRef> {
        self.enrollments.get(&user_id).cloned().unwrap_or_default()
    }

    fn user_full_name(&self, user_id: u64) -> Option<String> {
        self.user_names.get(&user_id).cloned()
    }
}

/// In-memory [`PageReferenceStore`].
#[derive(Debug, Default)]
pub struct MemoryPageStore {
    references: HashMap<(u64, PageKind, u64), PageReference>,
}

impl MemoryPageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageReferenceStore for MemoryPageStore {
    fn find(&self, context_id: u64, kind: PageKind, record_id: u64) -> Option<PageReference> {
        self.references.get(&(context_id, kind, record_id)).cloned()
    }

    fn save(&mut self, reference: PageReference) {
        self.references.insert(
            (reference.context_id, reference.kind, reference.record_id),
            reference,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(kind: PageKind, record_id: u64, url: &str) -> PageReference {
        PageReference {
            context_id: 10,
            kind,
            record_id,
            page_id: format!("page-{record_id}"),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_page_store_keys_on_context_kind_and_record() {
        let mut store = MemoryPageStore::new();
        store.save(reference(PageKind::Submission, 55, "https://n/1"));
        store.save(reference(PageKind::Feedback, 55, "https://n/2"));

        let submission = store.find(10, PageKind::Submission, 55).unwrap();
        let feedback = store.find(10, PageKind::Feedback, 55).unwrap();
        assert_eq!(submission.url, "https://n/1");
        assert_eq!(feedback.url, "https://n/2");
        assert!(store.find(11, PageKind::Submission, 55).is_none());
    }

    #[test]
    fn test_page_store_save_overwrites_same_key() {
        let mut store = MemoryPageStore::new();
        store.save(reference(PageKind::Submission, 55, "https://n/old"));
        store.save(reference(PageKind::Submission, 55, "https://n/new"));

        assert_eq!(
            store.find(10, PageKind::Submission, 55).unwrap().url,
            "https://n/new"
        );
    }

    #[test]
    fn test_directory_lookups() {
        let mut directory = MemoryDirectory::new();
        let course = CourseRef {
            id: 1,
            full_name: "Biology 101".to_string(),
        };
        directory.add_assignment(AssignmentRef {
            context_id: 10,
            name: "Essay".to_string(),
            course: course.clone(),
        });
        directory.enrol(7, course.clone());
        directory.add_user(7, "Ada Lovelace");

        assert_eq!(directory.assignment(10).unwrap().course, course);
        assert!(directory.assignment(11).is_none());
        assert_eq!(directory.enrolled_courses(7), vec![course]);
        assert!(directory.enrolled_courses(8).is_empty());
        assert_eq!(directory.user_full_name(7).as_deref(), Some("Ada Lovelace"));
    }
}
