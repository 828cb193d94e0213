//! Low-level Microsoft Graph HTTP client.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// How much of a failing response body is kept in the error.
const ERROR_BODY_SNIPPET_LEN: usize = 240;

/// Thin wrapper over `reqwest` for Graph calls.
///
/// Builds URLs from path segments, attaches bearer auth, and maps non-2xx
/// responses to [`ApiError::Remote`]. Segments are joined verbatim: Graph ids
/// are used exactly as the service returned them, which keeps them valid path
/// segments.
#[derive(Debug, Clone)]
pub(crate) struct GraphClient {
    http: reqwest::Client,
    base_url: String,
}

impl GraphClient {
    /// Creates a client rooted at `base_url` (trailing slashes trimmed).
    pub(crate) fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(segment);
        }
        url
    }

    /// GET returning a JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        segments: &[&str],
    ) -> Result<T, ApiError> {
        let request = self.http.get(self.url(segments));
        let response = self.send(request, token, "application/json").await?;
        Ok(response.json::<T>().await?)
    }

    /// POST with a JSON body, returning a JSON body.
    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        token: &str,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.http.post(self.url(segments)).json(body);
        let response = self.send(request, token, "application/json").await?;
        Ok(response.json::<T>().await?)
    }

    /// POST with an HTML body (page creation), returning a JSON body.
    pub(crate) async fn post_html<T: DeserializeOwned>(
        &self,
        token: &str,
        segments: &[&str],
        html_body: &str,
    ) -> Result<T, ApiError> {
        let request = self
            .http
            .post(self.url(segments))
            .header(reqwest::header::CONTENT_TYPE, "text/html")
            .body(html_body.to_string());
        let response = self.send(request, token, "application/json").await?;
        Ok(response.json::<T>().await?)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: &str,
        accept: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Remote {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_SNIPPET_LEN).collect(),
            })
        }
    }
}
