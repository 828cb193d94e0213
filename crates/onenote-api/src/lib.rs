//! OneNote notebook client for LMS assignment submission and feedback pages.
//!
//! Integration glue between a host LMS's assignment module and the Microsoft
//! Graph OneNote API. The client keeps a per-user "Moodle Notebook" in the
//! user's account, one section per course, and one page per submission or
//! feedback record; the page URL is handed back to the host to store on its
//! own records.
//!
//! Three seams keep the host out of this crate:
//!
//! - [`msaccount::MsAccountClient`] owns auth; callers check
//!   `is_logged_in()` before touching the API.
//! - [`HostDirectory`] supplies courses, assignments, and user names.
//! - [`PageReferenceStore`] persists which pages were already created, making
//!   [`OneNoteApi::get_page`] idempotent per submission/grade.
//!
//! ```ignore
//! let mut api = OneNoteApi::new(account, directory, page_store, user_id);
//! if api.account().is_logged_in() {
//!     let items = api.get_items_list(None).await?;
//!     let url = api.get_page(&PageRequest::submission(cmid, user_id, submission_id)).await?;
//! }
//! ```

mod api;
mod client;
mod error;
mod hooks;
mod host;
mod types;

pub use api::{MOODLE_NOTEBOOK_TITLE, OneNoteApi};
pub use error::ApiError;
pub use hooks::{GradeRecord, SubmissionRecord};
pub use host::{
    AssignmentRef, CourseRef, HostDirectory, MemoryDirectory, MemoryPageStore, PageReference,
    PageReferenceStore,
};
pub use types::{ItemKind, NotebookItem, PageKind, PageRequest, Role};
