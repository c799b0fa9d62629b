//! Song-scoped backend operations

use crate::backend::Backend;
use crate::{ClientError, Result};
use pmx_common::api::{CreateMixPackageRequest, CreateMixRequest, MixTrackDto, PartTrackDto};
use pmx_common::models::{MixTrack, PartTrack, Song, StereoMix};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use std::path::{Path, PathBuf};

/// Client for the endpoints under `/songs/{id}`
#[derive(Debug, Clone)]
pub struct SongClient<'a> {
    backend: &'a Backend,
    song_id: String,
    base_path: String,
}

impl<'a> SongClient<'a> {
    pub(crate) fn new(backend: &'a Backend, song_id: &str) -> Self {
        Self {
            backend,
            song_id: song_id.to_string(),
            base_path: format!("/songs/{}", song_id),
        }
    }

    pub fn song_id(&self) -> &str {
        &self.song_id
    }

    pub(crate) fn backend(&self) -> &'a Backend {
        self.backend
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}{}", self.base_path, suffix)
    }

    /// URL of a named part or mix; the name is escaped as one path segment
    fn track_url(&self, collection: &str, name: &str) -> Result<Url> {
        self.backend
            .segment_url(&["songs", self.song_id.as_str(), collection, name])
    }

    /// URL of the mix containing every part at its recorded level
    pub fn all_parts_media_url(&self) -> String {
        self.backend.url(&self.path("/mixes/All/media"))
    }

    // ========================================
    // Song record
    // ========================================

    pub async fn get(&self) -> Result<Song> {
        self.backend.get_json(&self.base_path).await
    }

    pub async fn update(&self, song: &Song) -> Result<Song> {
        let validation = song.validate();
        if !validation.is_valid() {
            return Err(ClientError::Validation(validation.summary()));
        }
        if song.id != self.song_id {
            return Err(ClientError::Validation(format!(
                "Song id {} does not match {}",
                song.id, self.song_id
            )));
        }

        tracing::info!(song_id = %self.song_id, "Updating song");
        let response = self
            .backend
            .http()
            .put(self.backend.url(&self.base_path))
            .json(song)
            .send()
            .await?;
        Backend::check(response, &self.base_path)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    pub async fn delete(&self) -> Result<()> {
        tracing::info!(song_id = %self.song_id, "Deleting song");
        let response = self
            .backend
            .http()
            .delete(self.backend.url(&self.base_path))
            .send()
            .await?;
        Backend::check(response, &self.base_path).await?;
        Ok(())
    }

    /// Delete a track by its backend path or URL
    pub async fn delete_track(&self, track_url: &str) -> Result<()> {
        let url = Url::parse(&self.backend.url(track_url))
            .map_err(|e| ClientError::Validation(format!("Invalid track URL {}: {}", track_url, e)))?;
        self.delete_at(url).await
    }

    pub async fn delete_part(&self, part: &str) -> Result<()> {
        self.delete_at(self.track_url("parts", part)?).await
    }

    pub async fn delete_mix(&self, name: &str) -> Result<()> {
        self.delete_at(self.track_url("mixes", name)?).await
    }

    async fn delete_at(&self, url: Url) -> Result<()> {
        tracing::info!(track = %url, "Deleting track");
        let path = url.path().to_string();
        let response = self.backend.http().delete(url).send().await?;
        Backend::check(response, &path).await?;
        Ok(())
    }

    // ========================================
    // Parts
    // ========================================

    pub async fn list_parts(&self) -> Result<Vec<PartTrack>> {
        let dtos: Vec<PartTrackDto> = self.backend.get_json(&self.path("/parts")).await?;
        Ok(dtos.into_iter().map(PartTrack::from).collect())
    }

    /// Upload one part's recording, replacing any previous upload
    pub async fn upload_part(&self, part: &str, audio_file: &Path) -> Result<PartTrack> {
        let form = Form::new().part("audioFile", file_part(audio_file).await?);
        let url = self.track_url("parts", part)?;
        let path = url.path().to_string();

        tracing::info!(song_id = %self.song_id, part = %part, file = %audio_file.display(), "Uploading part");
        let response = self
            .backend
            .http()
            .put(url)
            .multipart(form)
            .send()
            .await?;
        let dto: PartTrackDto = Backend::check(response, &path)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        Ok(dto.into())
    }

    /// Upload several parts in one request
    ///
    /// `parts[i]` names the recording in `files[i]`; both lists must have the
    /// same length. Fields are numbered from 1 as `file{n}` / `part{n}`.
    pub async fn upload_parts(&self, parts: &[String], files: &[PathBuf]) -> Result<Vec<PartTrack>> {
        if parts.len() != files.len() {
            return Err(ClientError::Validation(
                "Parts and files arrays must be the same length".to_string(),
            ));
        }

        let mut form = Form::new();
        for (p, (part, file)) in parts.iter().zip(files).enumerate() {
            let n = p + 1;
            form = form
                .part(format!("file{}", n), file_part(file).await?)
                .text(format!("part{}", n), part.clone());
        }

        let path = self.path("/parts?overwrite=true");
        tracing::info!(song_id = %self.song_id, count = parts.len(), "Uploading parts");
        let response = self
            .backend
            .http()
            .put(self.backend.url(&path))
            .multipart(form)
            .send()
            .await?;
        let dtos: Vec<PartTrackDto> = Backend::check(response, &path)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        Ok(dtos.into_iter().map(PartTrack::from).collect())
    }

    // ========================================
    // Mixes
    // ========================================

    pub async fn list_mixes(&self) -> Result<Vec<MixTrack>> {
        let dtos: Vec<MixTrackDto> = self.backend.get_json(&self.path("/mixes")).await?;
        Ok(dtos.into_iter().map(MixTrack::from).collect())
    }

    /// Standard mixes the backend can render for this song
    pub async fn default_mixes(&self) -> Result<Vec<StereoMix>> {
        let dtos: Vec<pmx_common::api::StereoMixDto> =
            self.backend.get_json(&self.path("/mixes/defaults")).await?;
        Ok(dtos.into_iter().map(StereoMix::from).collect())
    }

    pub async fn create_mix(&self, mix: &StereoMix, is_custom: bool) -> Result<MixTrack> {
        let request = CreateMixRequest::for_mix(mix, is_custom)?;
        self.submit_mix(&request).await
    }

    /// Send a prepared mix request; the backend answers with the created track(s)
    pub async fn submit_mix(&self, request: &CreateMixRequest) -> Result<MixTrack> {
        let path = self.path("/mixes");
        tracing::info!(song_id = %self.song_id, mix = %request.name, custom = request.description.is_some(), "Creating mix");
        let response = self
            .backend
            .http()
            .post(self.backend.url(&path))
            .json(request)
            .send()
            .await?;
        let dtos: Vec<MixTrackDto> = Backend::check(response, &path)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        dtos.into_iter()
            .next()
            .map(MixTrack::from)
            .ok_or_else(|| ClientError::ParseError("Backend returned no mix track".to_string()))
    }

    /// Render a batch of standard mixes
    pub async fn create_mix_package(&self, request: &CreateMixPackageRequest) -> Result<Vec<MixTrack>> {
        if request.mixes.is_empty() {
            return Err(ClientError::Validation("Mix package has no mixes to create".to_string()));
        }

        let path = self.path("/mixes/package");
        tracing::info!(
            song_id = %self.song_id,
            mixes = %request.mixes.join(","),
            "Creating mix package"
        );
        let response = self
            .backend
            .http()
            .post(self.backend.url(&path))
            .json(request)
            .send()
            .await?;
        let dtos: Vec<MixTrackDto> = Backend::check(response, &path)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        Ok(dtos.into_iter().map(MixTrack::from).collect())
    }

    // ========================================
    // Zip
    // ========================================

    /// Ask the backend to zip all tracks; returns the task id
    pub async fn submit_zip_request(&self) -> Result<String> {
        let path = self.path("/zip");
        let response = self.backend.http().post(self.backend.url(&path)).send().await?;
        let task_id: String = Backend::check(response, &path)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        tracing::info!(song_id = %self.song_id, task_id = %task_id, "Zip requested");
        Ok(task_id)
    }
}

async fn file_part(path: &Path) -> Result<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio".to_string());
    Ok(Part::bytes(bytes).file_name(file_name))
}
