//! # PMX Common Library
//!
//! Shared code for the PartMix client crates including:
//! - Song, track and mix models plus backend wire types
//! - Stereo channel balance redistribution
//! - Mix editing and mix package planning
//! - Playback parameter steppers and zip download state
//! - Configuration loading
//! - Duration formatting

pub mod api;
pub mod balance;
pub mod config;
pub mod error;
pub mod human_time;
pub mod mix;
pub mod models;
pub mod package;
pub mod playback;
pub mod zip;

pub use balance::{redistribute, BalanceError, Channel};
pub use error::{Error, Result};
pub use models::{MixTrack, PartTrack, Song, SongDraft, StereoMix, StereoMixSpec, Task, TaskStatus};
