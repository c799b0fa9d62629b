//! Song, track and mix models
//!
//! These are the shapes the client works with. The backend's wire format
//! differs in a few places (timestamps as strings, mix info nested under
//! other keys); see [`crate::api`] for the DTOs and conversions.

use crate::balance::{self, BalanceError, Channel};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ========================================
// Songs
// ========================================

/// A cataloged song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub arranger: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub duration_sec: f64,
    /// Sheet music file name, e.g. "sheet-music.pdf"
    #[serde(default)]
    pub sheet_music_file: Option<String>,
    /// Part name to audio file name, e.g. "Bass" -> "bass.wav"
    #[serde(default)]
    pub part_files: BTreeMap<String, String>,
}

/// A song that has not been stored yet (no id assigned)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDraft {
    pub title: String,
    #[serde(default)]
    pub arranger: String,
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_music_file: Option<String>,
}

impl SongDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validate_title(&self.title)
    }
}

impl Song {
    pub fn validate(&self) -> ValidationResult {
        let mut result = validate_title(&self.title);
        if self.id.trim().is_empty() {
            result.issues.push(ValidationIssue {
                field: SongField::Id,
                message: "Song id is missing".to_string(),
            });
        }
        result
    }

    /// Part names, sorted
    pub fn part_names(&self) -> Vec<String> {
        self.part_files.keys().cloned().collect()
    }
}

/// Song fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SongField {
    Id,
    Title,
}

/// A single validation problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: SongField,
    pub message: String,
}

/// Outcome of validating a song form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Message for one field, if that field has an issue
    pub fn message_for(&self, field: SongField) -> Option<&str> {
        self.issues
            .iter()
            .find(|issue| issue.field == field)
            .map(|issue| issue.message.as_str())
    }

    /// All messages joined for display
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(|issue| issue.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn validate_title(title: &str) -> ValidationResult {
    let mut issues = Vec::new();
    if title.trim().is_empty() {
        issues.push(ValidationIssue {
            field: SongField::Title,
            message: "Title cannot be empty".to_string(),
        });
    }
    ValidationResult { issues }
}

// ========================================
// Tracks
// ========================================

/// Metadata shared by part and mix tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub song_id: String,
    pub track_id: String,
    /// Backend-relative media path, e.g. "/songs/s1/parts/Bass/media"
    pub media_url: String,
    #[serde(default)]
    pub duration_sec: f64,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

/// An uploaded recording of one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartTrack {
    #[serde(flatten)]
    pub track: TrackInfo,
    /// Part name (the backend uses it as the track id)
    pub part: String,
}

/// A rendered stereo mix of several parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixTrack {
    #[serde(flatten)]
    pub track: TrackInfo,
    pub mix: StereoMix,
}

// ========================================
// Stereo mixes
// ========================================

/// Per-channel factors for each part of a mix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StereoMixSpec {
    pub left_factors: Vec<f64>,
    pub right_factors: Vec<f64>,
}

impl StereoMixSpec {
    /// Every part contributes equally to both channels
    pub fn uniform(parts: usize) -> Self {
        Self {
            left_factors: balance::uniform_factors(parts),
            right_factors: balance::uniform_factors(parts),
        }
    }

    pub fn factors(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::Left => &self.left_factors,
            Channel::Right => &self.right_factors,
        }
    }

    /// Set one part's factor on one channel, rebalancing the others.
    ///
    /// The other channel is never touched.
    pub fn redistribute(&mut self, channel: Channel, index: usize, value: f64) -> Result<(), BalanceError> {
        let updated = balance::redistribute(self.factors(channel), index, value)?;
        match channel {
            Channel::Left => self.left_factors = updated,
            Channel::Right => self.right_factors = updated,
        }
        Ok(())
    }

    /// Both channels have the same number of parts and sum to 1.0
    pub fn is_balanced(&self) -> bool {
        self.left_factors.len() == self.right_factors.len()
            && balance::is_balanced(&self.left_factors)
            && balance::is_balanced(&self.right_factors)
    }
}

/// A named combination of parts with channel factors and playback parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StereoMix {
    pub name: String,
    pub parts: Vec<String>,
    pub spec: StereoMixSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_shift: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_factor: Option<f64>,
}

impl StereoMix {
    /// Same mix under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Index of a part by name
    pub fn part_index(&self, part: &str) -> Option<usize> {
        self.parts.iter().position(|p| p == part)
    }
}

// ========================================
// Background tasks
// ========================================

/// Lifecycle status of a backend task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Scheduled,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A server-side background job such as zipping all mixes of a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    pub scheduled: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended: Option<DateTime<Utc>>,
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub output: Value,
}

impl Task {
    pub fn has_ended(&self) -> bool {
        self.ended.is_some()
    }

    pub fn succeeded(&self) -> bool {
        self.status == TaskStatus::Succeeded
    }

    /// Download URL reported by a finished zip task
    pub fn download_url(&self) -> Option<&str> {
        self.output.get("downloadUrl").and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_song() -> Song {
        Song {
            id: "s1".to_string(),
            title: "Sweet Adeline".to_string(),
            arranger: "Anon".to_string(),
            key: "Bb".to_string(),
            duration_sec: 142.0,
            sheet_music_file: None,
            part_files: BTreeMap::from([
                ("Bass".to_string(), "bass.wav".to_string()),
                ("Lead".to_string(), "lead.wav".to_string()),
            ]),
        }
    }

    #[test]
    fn test_song_serializes_camel_case() {
        let value = serde_json::to_value(sample_song()).unwrap();
        assert_eq!(value["durationSec"], json!(142.0));
        assert_eq!(value["partFiles"]["Bass"], json!("bass.wav"));
        assert!(value["sheetMusicFile"].is_null());
    }

    #[test]
    fn test_song_validation() {
        assert!(sample_song().validate().is_valid());

        let mut song = sample_song();
        song.title = "   ".to_string();
        song.id.clear();
        let result = song.validate();
        assert!(!result.is_valid());
        assert_eq!(result.message_for(SongField::Title), Some("Title cannot be empty"));
        assert_eq!(result.message_for(SongField::Id), Some("Song id is missing"));
        assert_eq!(result.summary(), "Title cannot be empty; Song id is missing");
    }

    #[test]
    fn test_draft_validation() {
        assert!(SongDraft::new("Lida Rose").validate().is_valid());
        assert!(!SongDraft::new("").validate().is_valid());
    }

    #[test]
    fn test_spec_redistribute_touches_one_channel() {
        let mut spec = StereoMixSpec::uniform(4);
        spec.redistribute(Channel::Left, 0, 0.7).unwrap();
        assert_eq!(spec.left_factors[0], 0.7);
        assert!((spec.left_factors[1] - 0.1).abs() < 1e-12);
        assert_eq!(spec.right_factors, vec![0.25; 4]);
        assert!(spec.is_balanced());
    }

    #[test]
    fn test_spec_uniform_single_part() {
        let spec = StereoMixSpec::uniform(1);
        assert_eq!(spec.left_factors, vec![1.0]);
        assert!(spec.is_balanced());
    }

    #[test]
    fn test_task_status_parsing() {
        let task: Task = serde_json::from_value(json!({
            "id": "t1",
            "status": "SUCCEEDED",
            "scheduled": "2025-03-01T10:00:00Z",
            "ended": "2025-03-01T10:00:05Z",
            "input": {},
            "output": { "downloadUrl": "/downloads/t1.zip" }
        }))
        .unwrap();
        assert!(task.has_ended());
        assert!(task.succeeded());
        assert_eq!(task.download_url(), Some("/downloads/t1.zip"));

        let pending: Task = serde_json::from_value(json!({
            "id": "t2",
            "status": "QUEUED_SOMEWHERE",
            "scheduled": null
        }))
        .unwrap();
        assert_eq!(pending.status, TaskStatus::Unknown);
        assert!(!pending.has_ended());
        assert_eq!(pending.download_url(), None);
    }

    #[test]
    fn test_mix_part_index() {
        let mix = StereoMix {
            name: "Full Mix".to_string(),
            parts: vec!["Bass".to_string(), "Lead".to_string()],
            spec: StereoMixSpec::uniform(2),
            pitch_shift: None,
            speed_factor: None,
        };
        assert_eq!(mix.part_index("Lead"), Some(1));
        assert_eq!(mix.part_index("Tenor"), None);
        assert_eq!(mix.renamed("custom").name, "custom");
    }
}
