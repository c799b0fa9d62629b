//! Backend API client
//!
//! Entry point for all backend calls. Song-scoped operations live on
//! [`SongClient`], obtained through [`Backend::song`].

use crate::song::SongClient;
use crate::{ClientError, Result};
use futures::StreamExt;
use pmx_common::config::ClientConfig;
use pmx_common::models::{Song, SongDraft, Task};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncWriteExt;

const USER_AGENT: &str = concat!("pmx/", env!("CARGO_PKG_VERSION"));

/// PartMix backend client
#[derive(Debug, Clone)]
pub struct Backend {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Backend {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.auth_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ClientError::Config(format!("Invalid auth token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for a backend path; absolute URLs pass through unchanged
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.config.backend_url, path)
        } else {
            format!("{}/{}", self.config.backend_url, path)
        }
    }

    /// Absolute URL for a path given as raw segments, each percent-encoded
    ///
    /// Part and mix names may contain `/`, `?` or `#`; joining them with
    /// [`url`](Self::url) would change the route.
    pub fn segment_url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = Url::parse(&self.config.backend_url)
            .map_err(|e| ClientError::Config(format!("Invalid backend URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::Config(format!("Backend URL cannot have a path: {}", self.config.backend_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turn non-success statuses into errors
    pub(crate) async fn check(response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::ApiError(status.as_u16(), error_text));
        }
        Ok(response)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        let response = self.http.get(&url).send().await?;
        let response = Self::check(response, path).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    // ========================================
    // Songs
    // ========================================

    pub async fn list_songs(&self) -> Result<Vec<Song>> {
        let songs: Vec<Song> = self.get_json("/songs").await?;
        tracing::debug!(count = songs.len(), "Listed songs");
        Ok(songs)
    }

    pub async fn create_song(&self, draft: &SongDraft) -> Result<Song> {
        let validation = draft.validate();
        if !validation.is_valid() {
            return Err(ClientError::Validation(validation.summary()));
        }

        let response = self.http.post(self.url("/songs")).json(draft).send().await?;
        let song: Song = Self::check(response, "/songs")
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;

        tracing::info!(song_id = %song.id, title = %song.title, "Created song");
        Ok(song)
    }

    /// Client for one song's endpoints
    pub fn song(&self, song_id: &str) -> SongClient<'_> {
        SongClient::new(self, song_id)
    }

    // ========================================
    // Background tasks
    // ========================================

    /// Fetch a task; `None` if the backend does not know it
    pub async fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        let path = format!("/tasks/{}", task_id);
        match self.get_json(&path).await {
            Ok(task) => Ok(Some(task)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Poll a task until it has ended
    ///
    /// Polls every `task_poll_interval_ms`. Gives up after
    /// `task_timeout_secs` when configured, otherwise waits indefinitely.
    pub async fn wait_for_task(&self, task_id: &str) -> Result<Task> {
        let started = Instant::now();
        let timeout = self.config.task_timeout();

        loop {
            let task = self
                .get_task(task_id)
                .await?
                .ok_or_else(|| ClientError::NotFound(format!("task {}", task_id)))?;

            if task.has_ended() {
                tracing::info!(task_id = %task_id, status = ?task.status, "Task ended");
                return Ok(task);
            }
            tracing::debug!(task_id = %task_id, status = ?task.status, "Task still running");

            if let Some(limit) = timeout {
                if started.elapsed() >= limit {
                    return Err(ClientError::TaskTimeout(task_id.to_string()));
                }
            }
            tokio::time::sleep(self.config.task_poll_interval()).await;
        }
    }

    // ========================================
    // Downloads
    // ========================================

    /// Stream a media or archive URL into a file, returning bytes written
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let url = self.url(url);
        tracing::info!(url = %url, dest = %dest.display(), "Downloading");

        let response = self.http.get(&url).send().await?;
        let response = Self::check(response, &url).await?;

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(bytes = written, "Download complete");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(url: &str) -> Backend {
        Backend::new(ClientConfig {
            backend_url: url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_joining() {
        let b = backend("http://localhost:8080");
        assert_eq!(b.url("/songs"), "http://localhost:8080/songs");
        assert_eq!(b.url("songs/1"), "http://localhost:8080/songs/1");
        assert_eq!(b.url("https://cdn.example/x.zip"), "https://cdn.example/x.zip");
    }

    #[test]
    fn test_segment_url_escapes_names() {
        let b = backend("http://localhost:8080");
        let url = b.segment_url(&["songs", "s1", "parts", "Bari #2?/B"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/songs/s1/parts/Bari%20%232%3F%2FB");
        assert_eq!(url.path_segments().map(|s| s.count()), Some(4));

        let prefixed = backend("https://songs.example/api");
        let url = prefixed.segment_url(&["songs", "s1", "mixes", "Lead Solo"]).unwrap();
        assert_eq!(url.as_str(), "https://songs.example/api/songs/s1/mixes/Lead%20Solo");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = Backend::new(ClientConfig {
            backend_url: "ftp://nope".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_rejects_unprintable_token() {
        let result = Backend::new(ClientConfig {
            auth_token: Some("bad\ntoken".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(ClientError::Config(_))));
    }
}
