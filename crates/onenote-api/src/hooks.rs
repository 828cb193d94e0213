//! Submission-save and feedback-save hooks exposed to the host.
//!
//! The host calls these from its own save flows. A notebook failure here
//! must never abort an assignment save or grade; both hooks swallow errors,
//! log them, and leave the record's `page_url` untouched so the host degrades
//! to "no page URL available".

use crate::api::OneNoteApi;
use crate::host::{HostDirectory, PageReferenceStore};
use crate::types::PageRequest;

/// Mirror of the host's assignment submission record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub context_id: u64,
    pub user_id: u64,
    pub id: u64,
    /// Filled in by [`OneNoteApi::attach_submission_page`].
    pub page_url: Option<String>,
}

/// Mirror of the host's feedback (grade) record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradeRecord {
    pub context_id: u64,
    pub user_id: u64,
    pub submission_id: u64,
    pub id: u64,
    /// Filled in by [`OneNoteApi::attach_feedback_page`].
    pub page_url: Option<String>,
}

impl<D: HostDirectory, P: PageReferenceStore> OneNoteApi<D, P> {
    /// Resolves the submission page and stores its URL into the record.
    ///
    /// Returns `true` when a URL was stored. On any failure the record is
    /// left unchanged and `false` is returned.
    pub async fn attach_submission_page(&mut self, record: &mut SubmissionRecord) -> bool {
        let request = PageRequest::submission(record.context_id, record.user_id, record.id);
        match self.get_page(&request).await {
            Ok(url) => {
                record.page_url = Some(url);
                true
            }
            Err(err) => {
                tracing::warn!(
                    context_id = record.context_id,
                    submission_id = record.id,
                    "could not save notebook page for submission: {err}"
                );
                false
            }
        }
    }

    /// Resolves the feedback page and stores its URL into the record.
    ///
    /// Returns `true` when a URL was stored. On any failure the record is
    /// left unchanged and `false` is returned.
    pub async fn attach_feedback_page(&mut self, record: &mut GradeRecord) -> bool {
        let request = PageRequest::feedback(
            record.context_id,
            record.user_id,
            record.submission_id,
            record.id,
        );
        match self.get_page(&request).await {
            Ok(url) => {
                record.page_url = Some(url);
                true
            }
            Err(err) => {
                tracing::warn!(
                    context_id = record.context_id,
                    grade_id = record.id,
                    "could not save notebook page for feedback: {err}"
                );
                false
            }
        }
    }
}
