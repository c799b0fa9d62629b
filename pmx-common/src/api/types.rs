//! Backend request/response types
//!
//! The backend sends track timestamps as plain strings (possibly empty),
//! stores a part's name in `trackId`, and nests a mix track's mix under
//! `mixInfo` with the channel factors under `mix`. These DTOs mirror that
//! shape exactly and convert into the models used everywhere else.

use crate::models::{MixTrack, PartTrack, StereoMix, StereoMixSpec, TrackInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ========================================
// Track Responses
// ========================================

/// Track metadata as sent by the backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDto {
    pub song_id: String,
    pub track_id: String,
    pub media_url: String,
    #[serde(default)]
    pub duration_sec: f64,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

/// Part tracks carry no fields beyond the common track metadata
pub type PartTrackDto = TrackDto;

/// Mix description as sent by the backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StereoMixDto {
    pub name: String,
    pub parts: Vec<String>,
    pub mix: StereoMixSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_shift: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_factor: Option<f64>,
}

/// Mix track as sent by the backend
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixTrackDto {
    #[serde(flatten)]
    pub track: TrackDto,
    pub mix_info: StereoMixDto,
}

/// Parse a backend timestamp; empty or malformed values mean "unknown"
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!(timestamp = %raw, error = %e, "Ignoring unparseable track timestamp");
            None
        }
    }
}

impl From<TrackDto> for TrackInfo {
    fn from(dto: TrackDto) -> Self {
        let created = parse_timestamp(dto.created.as_deref());
        let updated = parse_timestamp(dto.updated.as_deref());
        TrackInfo {
            song_id: dto.song_id,
            track_id: dto.track_id,
            media_url: dto.media_url,
            duration_sec: dto.duration_sec,
            created,
            updated,
        }
    }
}

impl From<TrackDto> for PartTrack {
    fn from(dto: TrackDto) -> Self {
        let part = dto.track_id.clone();
        PartTrack {
            track: dto.into(),
            part,
        }
    }
}

impl From<StereoMixDto> for StereoMix {
    fn from(dto: StereoMixDto) -> Self {
        StereoMix {
            name: dto.name,
            parts: dto.parts,
            spec: dto.mix,
            pitch_shift: dto.pitch_shift,
            speed_factor: dto.speed_factor,
        }
    }
}

impl From<MixTrackDto> for MixTrack {
    fn from(dto: MixTrackDto) -> Self {
        MixTrack {
            track: dto.track.into(),
            mix: dto.mix_info.into(),
        }
    }
}

// ========================================
// Mix Requests
// ========================================

/// Body of `POST /songs/{id}/mixes`
///
/// Standard mixes are rendered by name on the server, so `description` is
/// only sent for custom mixes, where it carries the JSON-encoded
/// [`StereoMixSpec`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateMixRequest {
    pub name: String,
    pub parts: Vec<String>,
    pub description: Option<String>,
}

impl CreateMixRequest {
    pub fn for_mix(mix: &StereoMix, is_custom: bool) -> crate::Result<Self> {
        let description = if is_custom {
            Some(serde_json::to_string(&mix.spec)?)
        } else {
            None
        };
        Ok(Self {
            name: mix.name.clone(),
            parts: mix.parts.clone(),
            description,
        })
    }

    /// Decode the custom spec carried in `description`, if any
    pub fn custom_spec(&self) -> crate::Result<Option<StereoMixSpec>> {
        match &self.description {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }
}

/// Body of `POST /songs/{id}/mixes/package`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMixPackageRequest {
    pub description: String,
    pub parts: Vec<String>,
    /// Names of the standard mixes to render, e.g. "Bass Dominant"
    pub mixes: Vec<String>,
    pub speed_factor: f64,
    pub pitch_shift: i32,
}
