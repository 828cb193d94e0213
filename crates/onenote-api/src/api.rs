//! Notebook hierarchy listing and page resolution.

use msaccount::MsAccountClient;

use crate::client::GraphClient;
use crate::error::ApiError;
use crate::host::{HostDirectory, PageReference, PageReferenceStore};
use crate::types::{
    CreateContainer, ItemKind, ItemPath, ListResponse, Notebook, NotebookItem, Page, PageKind,
    PageRequest, Section, SectionGroup, notebook_path, section_group_path, section_path,
};

/// Title of the notebook all course sections live under.
pub const MOODLE_NOTEBOOK_TITLE: &str = "Moodle Notebook";

const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";

/// Client for the remote notebook service, bound to one authenticated user.
///
/// Wraps an [`MsAccountClient`] for auth, a [`HostDirectory`] for course and
/// assignment lookups, and a [`PageReferenceStore`] for the pages already
/// attached to submission/feedback records. All calls are blocking remote
/// round-trips with no internal retries; callers impose timeouts externally.
pub struct OneNoteApi<D, P> {
    account: MsAccountClient,
    graph: GraphClient,
    directory: D,
    pages: P,
    /// Host-side id of the user `account` authenticates for.
    user_id: u64,
}

impl<D: HostDirectory, P: PageReferenceStore> OneNoteApi<D, P> {
    /// Creates a client against the public Graph endpoint.
    ///
    /// `user_id` is the host LMS id of the user the account client is bound
    /// to; it drives the course-section sync on listing.
    #[must_use]
    pub fn new(account: MsAccountClient, directory: D, pages: P, user_id: u64) -> Self {
        Self::with_endpoint(account, directory, pages, user_id, DEFAULT_GRAPH_ENDPOINT)
    }

    /// Creates a client against a custom endpoint; tests point this at a mock
    /// server.
    #[must_use]
    pub fn with_endpoint(
        account: MsAccountClient,
        directory: D,
        pages: P,
        user_id: u64,
        endpoint: &str,
    ) -> Self {
        Self {
            account,
            graph: GraphClient::new(endpoint),
            directory,
            pages,
            user_id,
        }
    }

    /// The account client, for login-state checks.
    #[must_use]
    pub fn account(&self) -> &MsAccountClient {
        &self.account
    }

    /// Mutable account access, for storing refresh tokens and refreshing.
    pub fn account_mut(&mut self) -> &mut MsAccountClient {
        &mut self.account
    }

    fn token(&self) -> Result<String, ApiError> {
        self.account.access_token().ok_or(ApiError::Auth)
    }

    /// Lists notebook items.
    ///
    /// With no `path`, lists the user's top-level notebooks and guarantees a
    /// notebook titled exactly [`MOODLE_NOTEBOOK_TITLE`] is among them,
    /// creating it only when absent. Sections for the user's enrolled courses
    /// are synced into that notebook as a side effect, so drilling into it
    /// shows one section per course. The check-then-create is not guarded
    /// against concurrent first-time callers; whether that race is prevented
    /// server-side is an unresolved idempotence boundary.
    ///
    /// With a `path` from an earlier listing, lists the immediate children of
    /// that container. Sections are leaves here (their pages are reached via
    /// [`get_page`](Self::get_page)), and a path that no listing produced
    /// yields an empty list. Ordering is whatever the provider returned.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] when not logged in; [`ApiError::Remote`] /
    /// [`ApiError::Transport`] on HTTP failure.
    pub async fn get_items_list(
        &mut self,
        path: Option<&str>,
    ) -> Result<Vec<NotebookItem>, ApiError> {
        let token = self.token()?;

        let Some(path) = path else {
            let items = self.list_top_level(&token).await?;
            if let Some(moodle) = items.iter().find(|item| item.title == MOODLE_NOTEBOOK_TITLE)
                && let Some(ItemPath::Notebook(id)) = ItemPath::parse(&moodle.path)
            {
                let notebook_id = id.to_string();
                self.sync_course_sections(&token, &notebook_id).await?;
            }
            return Ok(items);
        };

        match ItemPath::parse(path) {
            Some(ItemPath::Notebook(id)) => {
                let mut items = self
                    .list_section_groups(&token, &["notebooks", id, "sectionGroups"])
                    .await?;
                items.extend(
                    self.list_sections(&token, &["notebooks", id, "sections"])
                        .await?,
                );
                Ok(items)
            }
            Some(ItemPath::SectionGroup(id)) => {
                let mut items = self
                    .list_section_groups(&token, &["sectionGroups", id, "sectionGroups"])
                    .await?;
                items.extend(
                    self.list_sections(&token, &["sectionGroups", id, "sections"])
                        .await?,
                );
                Ok(items)
            }
            Some(ItemPath::Section(_)) | None => Ok(Vec::new()),
        }
    }

    /// Resolves the page for one submission or feedback record, creating it
    /// on first use.
    ///
    /// A previously created page is returned from the reference store with
    /// its URL unchanged, keyed by (context, submission or grade, kind). On a
    /// miss the page is created under a section named for the course inside
    /// the Moodle notebook, and the reference is persisted so the next call
    /// is a hit. Requests whose record id is absent create an untracked page.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] when not logged in; [`ApiError::NotFound`] when the
    /// context id matches no assignment; [`ApiError::Remote`] /
    /// [`ApiError::Transport`] on HTTP failure.
    pub async fn get_page(&mut self, request: &PageRequest) -> Result<String, ApiError> {
        let token = self.token()?;

        let assignment = self
            .directory
            .assignment(request.context_id)
            .ok_or(ApiError::NotFound(request.context_id))?;

        let record_id = request.record_id();
        if let Some(record_id) = record_id
            && let Some(existing) = self
                .pages
                .find(request.context_id, request.kind, record_id)
        {
            return Ok(existing.url);
        }

        let notebook_id = self.ensure_moodle_notebook(&token).await?;
        let section_id = self
            .ensure_section(&token, &notebook_id, &assignment.course.full_name)
            .await?;

        let student = request
            .submission_user_id
            .and_then(|user_id| self.directory.user_full_name(user_id));
        let title = page_title(request.kind, &assignment.name, student.as_deref());
        let html = page_html(&title, &assignment.name);

        let page: Page = self
            .graph
            .post_html(
                &token,
                &["me", "onenote", "sections", section_id.as_str(), "pages"],
                &html,
            )
            .await?;
        let url = page_web_url(&page)?;

        if let Some(record_id) = record_id {
            self.pages.save(PageReference {
                context_id: request.context_id,
                kind: request.kind,
                record_id,
                page_id: page.id.clone(),
                url: url.clone(),
            });
        } else {
            tracing::debug!(
                context_id = request.context_id,
                "page created without a submission/grade id; not tracked"
            );
        }

        tracing::debug!(context_id = request.context_id, page_id = %page.id, "notebook page created");
        Ok(url)
    }

    async fn list_top_level(&mut self, token: &str) -> Result<Vec<NotebookItem>, ApiError> {
        let response: ListResponse<Notebook> = self
            .graph
            .get_json(token, &["me", "onenote", "notebooks"])
            .await?;

        let mut items: Vec<NotebookItem> = response
            .value
            .into_iter()
            .map(|notebook| NotebookItem {
                title: notebook.display_name.unwrap_or_default(),
                path: notebook_path(&notebook.id),
                kind: ItemKind::Notebook,
            })
            .collect();

        if !items.iter().any(|item| item.title == MOODLE_NOTEBOOK_TITLE) {
            let created: Notebook = self
                .graph
                .post_json(
                    token,
                    &["me", "onenote", "notebooks"],
                    &CreateContainer {
                        display_name: MOODLE_NOTEBOOK_TITLE,
                    },
                )
                .await?;
            tracing::debug!(notebook_id = %created.id, "created the Moodle notebook");
            items.push(NotebookItem {
                title: created
                    .display_name
                    .unwrap_or_else(|| MOODLE_NOTEBOOK_TITLE.to_string()),
                path: notebook_path(&created.id),
                kind: ItemKind::Notebook,
            });
        }

        Ok(items)
    }

    async fn list_section_groups(
        &mut self,
        token: &str,
        tail: &[&str],
    ) -> Result<Vec<NotebookItem>, ApiError> {
        let mut segments = vec!["me", "onenote"];
        segments.extend_from_slice(tail);
        let response: ListResponse<SectionGroup> = self.graph.get_json(token, &segments).await?;
        Ok(response
            .value
            .into_iter()
            .map(|group| NotebookItem {
                title: group.display_name.unwrap_or_default(),
                path: section_group_path(&group.id),
                kind: ItemKind::SectionGroup,
            })
            .collect())
    }

    async fn list_sections(
        &mut self,
        token: &str,
        tail: &[&str],
    ) -> Result<Vec<NotebookItem>, ApiError> {
        let mut segments = vec!["me", "onenote"];
        segments.extend_from_slice(tail);
        let response: ListResponse<Section> = self.graph.get_json(token, &segments).await?;
        Ok(response
            .value
            .into_iter()
            .map(|section| NotebookItem {
                title: section.display_name.unwrap_or_default(),
                path: section_path(&section.id),
                kind: ItemKind::Section,
            })
            .collect())
    }

    /// Returns the id of the Moodle notebook, creating it when absent.
    async fn ensure_moodle_notebook(&mut self, token: &str) -> Result<String, ApiError> {
        let response: ListResponse<Notebook> = self
            .graph
            .get_json(token, &["me", "onenote", "notebooks"])
            .await?;

        if let Some(notebook) = response
            .value
            .into_iter()
            .find(|notebook| notebook.display_name.as_deref() == Some(MOODLE_NOTEBOOK_TITLE))
        {
            return Ok(notebook.id);
        }

        let created: Notebook = self
            .graph
            .post_json(
                token,
                &["me", "onenote", "notebooks"],
                &CreateContainer {
                    display_name: MOODLE_NOTEBOOK_TITLE,
                },
            )
            .await?;
        tracing::debug!(notebook_id = %created.id, "created the Moodle notebook");
        Ok(created.id)
    }

    /// Returns the id of the section titled `course_name` inside the
    /// notebook, creating it when absent.
    async fn ensure_section(
        &mut self,
        token: &str,
        notebook_id: &str,
        course_name: &str,
    ) -> Result<String, ApiError> {
        let response: ListResponse<Section> = self
            .graph
            .get_json(token, &["me", "onenote", "notebooks", notebook_id, "sections"])
            .await?;

        if let Some(section) = response
            .value
            .into_iter()
            .find(|section| section.display_name.as_deref() == Some(course_name))
        {
            return Ok(section.id);
        }

        let created: Section = self
            .graph
            .post_json(
                token,
                &["me", "onenote", "notebooks", notebook_id, "sections"],
                &CreateContainer {
                    display_name: course_name,
                },
            )
            .await?;
        tracing::debug!(section_id = %created.id, course = course_name, "created course section");
        Ok(created.id)
    }

    /// Creates a section for every enrolled course that does not have one
    /// yet. No-op for users with no enrollments.
    async fn sync_course_sections(
        &mut self,
        token: &str,
        notebook_id: &str,
    ) -> Result<(), ApiError> {
        let courses = self.directory.enrolled_courses(self.user_id);
        if courses.is_empty() {
            return Ok(());
        }

        let response: ListResponse<Section> = self
            .graph
            .get_json(token, &["me", "onenote", "notebooks", notebook_id, "sections"])
            .await?;
        let existing: Vec<String> = response
            .value
            .into_iter()
            .filter_map(|section| section.display_name)
            .collect();

        for course in courses {
            if existing.iter().any(|name| *name == course.full_name) {
                continue;
            }
            let created: Section = self
                .graph
                .post_json(
                    token,
                    &["me", "onenote", "notebooks", notebook_id, "sections"],
                    &CreateContainer {
                        display_name: &course.full_name,
                    },
                )
                .await?;
            tracing::debug!(section_id = %created.id, course = %course.full_name, "created course section");
        }
        Ok(())
    }
}

fn page_title(kind: PageKind, assignment_name: &str, student: Option<&str>) -> String {
    let base = match kind {
        PageKind::Submission => format!("Submission: {assignment_name}"),
        PageKind::Feedback => format!("Feedback: {assignment_name}"),
    };
    match student {
        Some(student) => format!("{base} ({student})"),
        None => base,
    }
}

fn page_html(title: &str, assignment_name: &str) -> String {
    format!(
        r"<!DOCTYPE html>
<html>
  <head>
    <title>{}</title>
  </head>
  <body>
    <h1>{}</h1>
  </body>
</html>",
        html_escape(title),
        html_escape(assignment_name)
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Extracts the web URL of a created page.
///
/// A 2xx page response without a `oneNoteWebUrl` link is treated as a remote
/// failure; the integration has nothing useful to store without it.
fn page_web_url(page: &Page) -> Result<String, ApiError> {
    page.links
        .as_ref()
        .and_then(|links| links.one_note_web_url.as_ref())
        .map(|link| link.href.clone())
        .ok_or_else(|| ApiError::Remote {
            status: 200,
            body: "page response missing links.oneNoteWebUrl".to_string(),
        })
}
