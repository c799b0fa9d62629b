//! Mix editing
//!
//! A [`MixEditor`] holds the stereo mix a user is putting together for one
//! song. It starts on a custom full mix, can switch to one of the standard
//! mixes the backend offers, and applies channel edits through the balance
//! redistributor so both channels stay balanced.

use crate::api::CreateMixRequest;
use crate::balance::{BalanceError, Channel};
use crate::models::{StereoMix, StereoMixSpec};
use crate::package::FULL_MIX;
use crate::playback::PlaybackParams;
use std::collections::BTreeSet;
use thiserror::Error;

/// Selection value that switches the editor to a custom mix
pub const CUSTOM_MIX: &str = "custom";

/// Track name offered for a new custom mix
pub const DEFAULT_CUSTOM_TRACK_NAME: &str = "Custom";

/// Mix editor errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    #[error("Unknown mix: {0}")]
    UnknownMix(String),

    #[error("Mix '{0}' already exists for this song")]
    AlreadyExists(String),

    #[error("Standard mixes cannot be edited; select the custom mix first")]
    NotEditable,

    #[error("Unknown part: {0}")]
    UnknownPart(String),

    #[error("Track name cannot be empty")]
    EmptyTrackName,

    #[error("Factor must be a finite number (got {0})")]
    InvalidFactor(f64),

    #[error(transparent)]
    Balance(#[from] BalanceError),

    #[error("Failed to encode mix: {0}")]
    Encode(String),
}

/// Stereo mix where every part contributes equally to both channels
pub fn full_mix_for_parts(name: impl Into<String>, parts: &[String]) -> StereoMix {
    StereoMix {
        name: name.into(),
        parts: parts.to_vec(),
        spec: StereoMixSpec::uniform(parts.len()),
        pitch_shift: None,
        speed_factor: None,
    }
}

/// Editing state for creating one mix track
#[derive(Debug, Clone)]
pub struct MixEditor {
    parts: Vec<String>,
    defaults: Vec<StereoMix>,
    existing: BTreeSet<String>,
    current: StereoMix,
    is_custom: bool,
    custom_track_name: String,
}

impl MixEditor {
    /// Create an editor for a song's parts
    ///
    /// # Arguments
    /// * `parts` - Part names of the song, in mix order
    /// * `defaults` - Standard mixes the backend can render
    /// * `existing` - Names of mixes the song already has
    pub fn new(
        parts: Vec<String>,
        defaults: Vec<StereoMix>,
        existing: impl IntoIterator<Item = String>,
    ) -> Self {
        let current = full_mix_for_parts(CUSTOM_MIX, &parts);
        Self {
            parts,
            defaults,
            existing: existing.into_iter().collect(),
            current,
            is_custom: true,
            custom_track_name: DEFAULT_CUSTOM_TRACK_NAME.to_string(),
        }
    }

    pub fn current(&self) -> &StereoMix {
        &self.current
    }

    pub fn is_custom(&self) -> bool {
        self.is_custom
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Standard mixes that the song does not have yet
    pub fn selectable_mixes(&self) -> impl Iterator<Item = &StereoMix> {
        self.defaults
            .iter()
            .filter(move |m| !self.existing.contains(&m.name))
    }

    /// Switch to a standard mix by name, or to a fresh custom mix with [`CUSTOM_MIX`]
    pub fn select(&mut self, name: &str) -> Result<(), EditorError> {
        if name == CUSTOM_MIX {
            tracing::debug!("Switching to custom full mix");
            self.current = full_mix_for_parts(CUSTOM_MIX, &self.parts);
            self.is_custom = true;
            return Ok(());
        }

        if self.existing.contains(name) {
            return Err(EditorError::AlreadyExists(name.to_string()));
        }

        let selected = self
            .defaults
            .iter()
            .find(|m| m.name == name)
            .cloned()
            .ok_or_else(|| EditorError::UnknownMix(name.to_string()))?;

        tracing::debug!(mix = %name, "Switching to standard mix");
        self.current = selected;
        self.is_custom = false;
        Ok(())
    }

    /// Set one part's factor on one channel of the custom mix.
    ///
    /// The value is clamped to `[0, 1]` before the other parts are rebalanced.
    /// NaN and infinities are rejected and leave the mix unchanged.
    pub fn set_factor(&mut self, channel: Channel, index: usize, value: f64) -> Result<(), EditorError> {
        if !self.is_custom {
            return Err(EditorError::NotEditable);
        }
        if !value.is_finite() {
            return Err(EditorError::InvalidFactor(value));
        }
        let value = value.clamp(0.0, 1.0);
        self.current.spec.redistribute(channel, index, value)?;
        Ok(())
    }

    /// [`set_factor`](Self::set_factor) addressing the part by name
    pub fn set_part_factor(&mut self, channel: Channel, part: &str, value: f64) -> Result<(), EditorError> {
        let index = self
            .current
            .part_index(part)
            .ok_or_else(|| EditorError::UnknownPart(part.to_string()))?;
        self.set_factor(channel, index, value)
    }

    pub fn set_playback(&mut self, params: PlaybackParams) {
        self.current.pitch_shift = Some(params.pitch_shift);
        self.current.speed_factor = Some(params.speed_factor);
    }

    pub fn set_custom_track_name(&mut self, name: impl Into<String>) {
        self.custom_track_name = name.into();
    }

    /// Name the created track will get
    pub fn track_name(&self) -> &str {
        if self.is_custom {
            &self.custom_track_name
        } else {
            &self.current.name
        }
    }

    /// Mix as it will be submitted, named after the track
    pub fn submission(&self) -> StereoMix {
        self.current.renamed(self.track_name())
    }

    /// Build the backend request for the current mix
    pub fn to_request(&self) -> Result<CreateMixRequest, EditorError> {
        if self.track_name().trim().is_empty() {
            return Err(EditorError::EmptyTrackName);
        }
        CreateMixRequest::for_mix(&self.submission(), self.is_custom)
            .map_err(|e| EditorError::Encode(e.to_string()))
    }

    /// Back to a custom full mix with the default track name
    pub fn reset(&mut self) {
        self.current = full_mix_for_parts(CUSTOM_MIX, &self.parts);
        self.is_custom = true;
        self.custom_track_name = DEFAULT_CUSTOM_TRACK_NAME.to_string();
    }

    /// The standard full mix among the defaults, or a locally built one
    pub fn full_mix(&self) -> StereoMix {
        self.defaults
            .iter()
            .find(|m| m.name == FULL_MIX)
            .cloned()
            .unwrap_or_else(|| full_mix_for_parts(FULL_MIX, &self.parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts() -> Vec<String> {
        ["Bass", "Bari", "Lead", "Tenor"].iter().map(|s| s.to_string()).collect()
    }

    fn defaults() -> Vec<StereoMix> {
        vec![
            full_mix_for_parts(FULL_MIX, &parts()),
            StereoMix {
                name: "Bass Dominant".to_string(),
                parts: parts(),
                spec: StereoMixSpec {
                    left_factors: vec![1.0, 0.0, 0.0, 0.0],
                    right_factors: vec![0.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
                },
                pitch_shift: None,
                speed_factor: None,
            },
        ]
    }

    #[test]
    fn test_starts_on_custom_full_mix() {
        let editor = MixEditor::new(parts(), defaults(), Vec::new());
        assert!(editor.is_custom());
        assert_eq!(editor.current().name, CUSTOM_MIX);
        assert_eq!(editor.current().spec.left_factors, vec![0.25; 4]);
        assert_eq!(editor.track_name(), DEFAULT_CUSTOM_TRACK_NAME);
    }

    #[test]
    fn test_selectable_mixes_skip_existing() {
        let editor = MixEditor::new(parts(), defaults(), vec![FULL_MIX.to_string()]);
        let names: Vec<_> = editor.selectable_mixes().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Bass Dominant"]);
    }

    #[test]
    fn test_select_standard_mix() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        editor.select("Bass Dominant").unwrap();
        assert!(!editor.is_custom());
        assert_eq!(editor.track_name(), "Bass Dominant");
        assert_eq!(editor.set_factor(Channel::Left, 0, 0.5), Err(EditorError::NotEditable));

        let req = editor.to_request().unwrap();
        assert_eq!(req.name, "Bass Dominant");
        assert!(req.description.is_none());
    }

    #[test]
    fn test_select_unknown_or_existing() {
        let mut editor = MixEditor::new(parts(), defaults(), vec![FULL_MIX.to_string()]);
        assert_eq!(
            editor.select("Lead Solo"),
            Err(EditorError::UnknownMix("Lead Solo".to_string()))
        );
        assert_eq!(
            editor.select(FULL_MIX),
            Err(EditorError::AlreadyExists(FULL_MIX.to_string()))
        );
        assert!(editor.is_custom());
    }

    #[test]
    fn test_custom_edit_rebalances_one_channel() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        editor.set_part_factor(Channel::Left, "Lead", 0.7).unwrap();

        let spec = &editor.current().spec;
        assert_eq!(spec.left_factors[2], 0.7);
        assert!((spec.left_factors[0] - 0.1).abs() < 1e-12);
        assert_eq!(spec.right_factors, vec![0.25; 4]);
        assert!(spec.is_balanced());
    }

    #[test]
    fn test_custom_edit_clamps_to_slider_bounds() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        editor.set_factor(Channel::Right, 1, 1.4).unwrap();
        assert_eq!(editor.current().spec.right_factors, vec![0.0, 1.0, 0.0, 0.0]);

        editor.set_factor(Channel::Right, 1, -0.2).unwrap();
        let right = &editor.current().spec.right_factors;
        assert_eq!(right[1], 0.0);
        assert!((right[0] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_factor_rejected() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        assert!(matches!(
            editor.set_factor(Channel::Left, 0, f64::NAN),
            Err(EditorError::InvalidFactor(v)) if v.is_nan()
        ));
        assert_eq!(
            editor.set_part_factor(Channel::Right, "Bass", f64::INFINITY),
            Err(EditorError::InvalidFactor(f64::INFINITY))
        );
        assert_eq!(editor.current().spec, StereoMixSpec::uniform(4));
        assert!(editor.current().spec.is_balanced());
    }

    #[test]
    fn test_unknown_part_and_index() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        assert_eq!(
            editor.set_part_factor(Channel::Left, "Soprano", 0.5),
            Err(EditorError::UnknownPart("Soprano".to_string()))
        );
        assert!(matches!(
            editor.set_factor(Channel::Left, 9, 0.5),
            Err(EditorError::Balance(BalanceError::IndexOutOfRange { index: 9, len: 4 }))
        ));
    }

    #[test]
    fn test_custom_request_carries_spec() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        editor.set_custom_track_name("Tenor Loud");
        editor.set_part_factor(Channel::Left, "Tenor", 0.4).unwrap();

        let req = editor.to_request().unwrap();
        assert_eq!(req.name, "Tenor Loud");
        assert_eq!(req.parts, parts());
        let spec = req.custom_spec().unwrap().unwrap();
        assert_eq!(spec, editor.current().spec);
    }

    #[test]
    fn test_empty_track_name_rejected() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        editor.set_custom_track_name("  ");
        assert_eq!(editor.to_request(), Err(EditorError::EmptyTrackName));
    }

    #[test]
    fn test_reset() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        editor.select("Bass Dominant").unwrap();
        editor.reset();
        assert!(editor.is_custom());
        assert_eq!(editor.current().spec, StereoMixSpec::uniform(4));
        assert_eq!(editor.track_name(), DEFAULT_CUSTOM_TRACK_NAME);
    }

    #[test]
    fn test_full_mix_falls_back_to_local() {
        let editor = MixEditor::new(parts(), Vec::new(), Vec::new());
        let full = editor.full_mix();
        assert_eq!(full.name, FULL_MIX);
        assert!(full.spec.is_balanced());
    }

    #[test]
    fn test_playback_params_applied() {
        let mut editor = MixEditor::new(parts(), defaults(), Vec::new());
        editor.set_playback(PlaybackParams { pitch_shift: -2, speed_factor: 0.9 });
        assert_eq!(editor.submission().pitch_shift, Some(-2));
        assert_eq!(editor.submission().speed_factor, Some(0.9));
    }
}
