//! Pitch shift and speed factor selection
//!
//! Both parameters are picked from short fixed lists of labels and stepped
//! up or down one entry at a time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pitch shift choices in semitones
pub const PITCH_SHIFT_STEPS: [&str; 7] = ["-3", "-2", "-1", "0", "+1", "+2", "+3"];
pub const DEFAULT_PITCH_SHIFT: &str = "0";

/// Playback speed choices
pub const SPEED_STEPS: [&str; 9] = ["50%", "66%", "75%", "90%", "100%", "110%", "125%", "133%", "150%"];
pub const DEFAULT_SPEED: &str = "100%";

/// Stepper and label parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepperError {
    #[error("Initial value '{value}' is not in the list of allowed values: [{allowed}]")]
    NotAllowed { value: String, allowed: String },

    #[error("Cannot parse '{0}' as a pitch shift")]
    BadPitch(String),

    #[error("Cannot parse '{0}' as a speed percentage")]
    BadSpeed(String),
}

/// A cursor over an ordered list of labels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueStepper {
    values: Vec<String>,
    index: usize,
}

impl ValueStepper {
    pub fn new<S: AsRef<str>>(values: &[S], initial: &str) -> Result<Self, StepperError> {
        let values: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
        let index = values
            .iter()
            .position(|v| v == initial)
            .ok_or_else(|| StepperError::NotAllowed {
                value: initial.to_string(),
                allowed: values.join(","),
            })?;
        Ok(Self { values, index })
    }

    pub fn pitch() -> Self {
        // Both constants are fixed and contain their defaults
        Self {
            values: PITCH_SHIFT_STEPS.iter().map(|s| s.to_string()).collect(),
            index: 3,
        }
    }

    pub fn speed() -> Self {
        Self {
            values: SPEED_STEPS.iter().map(|s| s.to_string()).collect(),
            index: 4,
        }
    }

    pub fn current(&self) -> &str {
        &self.values[self.index]
    }

    /// Move one step up, stopping at the last value
    pub fn increment(&mut self) -> &str {
        self.index = (self.index + 1).min(self.values.len() - 1);
        self.current()
    }

    /// Move one step down, stopping at the first value
    pub fn decrement(&mut self) -> &str {
        self.index = self.index.saturating_sub(1);
        self.current()
    }
}

/// Parse a pitch label such as "+2", "0" or "-3"
pub fn parse_pitch_shift(label: &str) -> Result<i32, StepperError> {
    let trimmed = label.trim();
    trimmed
        .strip_prefix('+')
        .unwrap_or(trimmed)
        .parse()
        .map_err(|_| StepperError::BadPitch(label.to_string()))
}

/// Parse a speed label such as "110%" into a factor (1.1)
pub fn parse_speed_factor(label: &str) -> Result<f64, StepperError> {
    let trimmed = label.trim();
    let pct: u32 = trimmed
        .strip_suffix('%')
        .unwrap_or(trimmed)
        .parse()
        .map_err(|_| StepperError::BadSpeed(label.to_string()))?;
    Ok(pct as f64 / 100.0)
}

/// Playback parameters passed through to the backend renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackParams {
    pub pitch_shift: i32,
    pub speed_factor: f64,
}

impl Default for PlaybackParams {
    fn default() -> Self {
        Self {
            pitch_shift: 0,
            speed_factor: 1.0,
        }
    }
}

impl PlaybackParams {
    /// Parameters from the labels two steppers currently show
    pub fn from_labels(pitch: &str, speed: &str) -> Result<Self, StepperError> {
        Ok(Self {
            pitch_shift: parse_pitch_shift(pitch)?,
            speed_factor: parse_speed_factor(speed)?,
        })
    }

    pub fn from_steppers(pitch: &ValueStepper, speed: &ValueStepper) -> Result<Self, StepperError> {
        Self::from_labels(pitch.current(), speed.current())
    }
}
