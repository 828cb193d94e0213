//! Domain types and Microsoft Graph wire structs.

use serde::{Deserialize, Serialize};

/// Kind of a hierarchical container in the remote notebook tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Notebook,
    SectionGroup,
    Section,
}

/// One container in a listing response.
///
/// `path` is an opaque identifier unique within a single listing; pass it
/// back to [`OneNoteApi::get_items_list`](crate::OneNoteApi::get_items_list)
/// to fetch the item's children. `title` need not be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookItem {
    pub title: String,
    pub path: String,
    pub kind: ItemKind,
}

/// Whether a page belongs to a submission or to feedback on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Submission,
    Feedback,
}

/// Role of the user the page is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Teacher,
}

/// Identifies the page wanted for one assignment submission or feedback
/// record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Host LMS identifier of the assignment activity instance.
    pub context_id: u64,
    pub kind: PageKind,
    pub role: Role,
    /// User the submission belongs to (not necessarily the caller).
    pub submission_user_id: Option<u64>,
    pub submission_id: Option<u64>,
    pub grade_id: Option<u64>,
}

impl PageRequest {
    /// Request for a student's submission page.
    #[must_use]
    pub fn submission(context_id: u64, submission_user_id: u64, submission_id: u64) -> Self {
        Self {
            context_id,
            kind: PageKind::Submission,
            role: Role::Student,
            submission_user_id: Some(submission_user_id),
            submission_id: Some(submission_id),
            grade_id: None,
        }
    }

    /// Request for the teacher's feedback page on a submission.
    #[must_use]
    pub fn feedback(
        context_id: u64,
        submission_user_id: u64,
        submission_id: u64,
        grade_id: u64,
    ) -> Self {
        Self {
            context_id,
            kind: PageKind::Feedback,
            role: Role::Teacher,
            submission_user_id: Some(submission_user_id),
            submission_id: Some(submission_id),
            grade_id: Some(grade_id),
        }
    }

    /// The host record the page is keyed on: the grade for feedback pages,
    /// the submission otherwise.
    #[must_use]
    pub fn record_id(&self) -> Option<u64> {
        match self.kind {
            PageKind::Feedback => self.grade_id,
            PageKind::Submission => self.submission_id,
        }
    }
}

/// Parsed form of a [`NotebookItem::path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemPath<'a> {
    Notebook(&'a str),
    SectionGroup(&'a str),
    Section(&'a str),
}

impl<'a> ItemPath<'a> {
    /// Parses an opaque path produced by an earlier listing.
    pub(crate) fn parse(path: &'a str) -> Option<Self> {
        if let Some(id) = path.strip_prefix("notebooks/") {
            return Some(Self::Notebook(id));
        }
        if let Some(id) = path.strip_prefix("section-groups/") {
            return Some(Self::SectionGroup(id));
        }
        if let Some(id) = path.strip_prefix("sections/") {
            return Some(Self::Section(id));
        }
        None
    }
}

pub(crate) fn notebook_path(id: &str) -> String {
    format!("notebooks/{id}")
}

pub(crate) fn section_group_path(id: &str) -> String {
    format!("section-groups/{id}")
}

pub(crate) fn section_path(id: &str) -> String {
    format!("sections/{id}")
}

// ===== Microsoft Graph wire structs =====

/// Envelope around every Graph collection response.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse<T> {
    pub value: Vec<T>,
}

/// A OneNote notebook as returned by the Graph API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Notebook {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A section group within a notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SectionGroup {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A section within a notebook or section group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Section {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A OneNote page; only the fields the integration reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Page {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub links: Option<PageLinks>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageLinks {
    #[serde(default)]
    pub one_note_web_url: Option<ExternalLink>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExternalLink {
    pub href: String,
}

/// Body for notebook/section creation requests.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateContainer<'a> {
    pub display_name: &'a str,
}
