//! Subcommand handlers

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use pmx_client::{zip_song, Backend};
use pmx_common::balance::{self, Channel};
use pmx_common::human_time::format_duration;
use pmx_common::mix::MixEditor;
use pmx_common::models::SongDraft;
use pmx_common::package::PackagePlanner;
use pmx_common::playback::{PlaybackParams, ValueStepper, PITCH_SHIFT_STEPS, SPEED_STEPS};
use pmx_common::zip::ZipState;
use tracing::{info, warn};

/// One `--set CHANNEL:PART=VALUE` edit
#[derive(Debug, Clone, PartialEq)]
pub struct FactorEdit {
    pub channel: Channel,
    pub part: String,
    pub value: f64,
}

pub fn parse_edit(raw: &str) -> Result<FactorEdit> {
    let malformed = || anyhow!("Expected CHANNEL:PART=VALUE, got '{}'", raw);
    let (channel, rest) = raw.split_once(':').ok_or_else(malformed)?;
    let (part, value) = rest.rsplit_once('=').ok_or_else(malformed)?;

    let part = part.trim();
    if part.is_empty() {
        return Err(malformed());
    }
    let channel: Channel = channel.trim().parse().map_err(|e: String| anyhow!(e))?;
    let value: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid factor '{}'", value))?;
    if !value.is_finite() {
        bail!("Factor must be a finite number, got '{}'", raw);
    }

    Ok(FactorEdit {
        channel,
        part: part.to_string(),
        value,
    })
}

/// Parse a `PART=FILE` upload argument
pub fn parse_upload(raw: &str) -> Result<(String, PathBuf)> {
    match raw.split_once('=') {
        Some((part, file)) if !part.trim().is_empty() && !file.is_empty() => {
            Ok((part.trim().to_string(), PathBuf::from(file)))
        }
        _ => bail!("Expected PART=FILE, got '{}'", raw),
    }
}

/// Playback parameters from stepper labels, rejecting values the steppers do not offer
pub fn playback_params(pitch: &str, speed: &str) -> Result<PlaybackParams> {
    let pitch = ValueStepper::new(&PITCH_SHIFT_STEPS[..], pitch)?;
    let speed = ValueStepper::new(&SPEED_STEPS[..], speed)?;
    Ok(PlaybackParams::from_steppers(&pitch, &speed)?)
}

fn format_factors(factors: &[f64]) -> String {
    factors
        .iter()
        .map(|f| format!("{:.4}", f))
        .collect::<Vec<_>>()
        .join(",")
}

// ========================================
// Local
// ========================================

pub fn balance(factors: &[f64], index: usize, value: f64) -> Result<()> {
    let result = balance::redistribute(factors, index, value)?;
    if !balance::is_balanced(&result) {
        warn!(sum = balance::factor_sum(&result), "Factors do not sum to 1");
    }
    println!("{}", format_factors(&result));
    Ok(())
}

// ========================================
// Songs
// ========================================

pub async fn list_songs(backend: &Backend) -> Result<()> {
    let songs = backend.list_songs().await.context("Failed to list songs")?;
    for song in songs {
        println!(
            "{:<12} {:<32} {:<24} {:>4} {:>8}",
            song.id,
            song.title,
            song.arranger,
            song.key,
            format_duration(song.duration_sec)
        );
    }
    Ok(())
}

pub async fn show_song(backend: &Backend, song_id: &str) -> Result<()> {
    let song = backend
        .song(song_id)
        .get()
        .await
        .with_context(|| format!("Failed to load song {}", song_id))?;
    println!("{}", serde_json::to_string_pretty(&song)?);
    Ok(())
}

pub async fn create_song(backend: &Backend, title: String, arranger: String, key: String) -> Result<()> {
    let draft = SongDraft {
        title,
        arranger,
        key,
        sheet_music_file: None,
    };
    let song = backend.create_song(&draft).await.context("Failed to create song")?;
    println!("{}", song.id);
    Ok(())
}

pub async fn update_song(
    backend: &Backend,
    song_id: &str,
    title: Option<String>,
    arranger: Option<String>,
    key: Option<String>,
) -> Result<()> {
    let client = backend.song(song_id);
    let mut song = client
        .get()
        .await
        .with_context(|| format!("Failed to load song {}", song_id))?;

    if let Some(title) = title {
        song.title = title;
    }
    if let Some(arranger) = arranger {
        song.arranger = arranger;
    }
    if let Some(key) = key {
        song.key = key;
    }

    client.update(&song).await.context("Failed to update song")?;
    info!(song_id = %song_id, "Song updated");
    Ok(())
}

pub async fn delete_song(backend: &Backend, song_id: &str) -> Result<()> {
    backend
        .song(song_id)
        .delete()
        .await
        .with_context(|| format!("Failed to delete song {}", song_id))
}

// ========================================
// Parts
// ========================================

pub async fn list_parts(backend: &Backend, song_id: &str) -> Result<()> {
    let parts = backend
        .song(song_id)
        .list_parts()
        .await
        .context("Failed to list parts")?;
    for part in parts {
        println!(
            "{:<16} {:>8}  {}",
            part.part,
            format_duration(part.track.duration_sec),
            backend.url(&part.track.media_url)
        );
    }
    Ok(())
}

pub async fn upload_parts(backend: &Backend, song_id: &str, files: &[String]) -> Result<()> {
    let (parts, paths): (Vec<String>, Vec<PathBuf>) = files
        .iter()
        .map(|raw| parse_upload(raw))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();

    let song = backend.song(song_id);
    let uploaded = if parts.len() == 1 {
        vec![song
            .upload_part(&parts[0], &paths[0])
            .await
            .with_context(|| format!("Failed to upload {}", paths[0].display()))?]
    } else {
        song.upload_parts(&parts, &paths)
            .await
            .context("Failed to upload parts")?
    };

    for part in uploaded {
        println!("{}", part.part);
    }
    Ok(())
}

pub async fn delete_part(backend: &Backend, song_id: &str, part: &str) -> Result<()> {
    backend
        .song(song_id)
        .delete_part(part)
        .await
        .with_context(|| format!("Failed to delete part {}", part))
}

// ========================================
// Mixes
// ========================================

/// Editor seeded with the song's parts, standard mixes and existing mixes
async fn mix_editor(backend: &Backend, song_id: &str) -> Result<MixEditor> {
    let song = backend.song(song_id);
    let parts: Vec<String> = song
        .list_parts()
        .await
        .context("Failed to list parts")?
        .into_iter()
        .map(|p| p.part)
        .collect();
    let existing: Vec<String> = song
        .list_mixes()
        .await
        .context("Failed to list mixes")?
        .into_iter()
        .map(|m| m.mix.name)
        .collect();
    let defaults = song
        .default_mixes()
        .await
        .context("Failed to load standard mixes")?;
    Ok(MixEditor::new(parts, defaults, existing))
}

pub async fn list_mixes(backend: &Backend, song_id: &str) -> Result<()> {
    let mixes = backend
        .song(song_id)
        .list_mixes()
        .await
        .context("Failed to list mixes")?;
    for mix in mixes {
        println!(
            "{:<24} {:>8}  L[{}] R[{}]",
            mix.mix.name,
            format_duration(mix.track.duration_sec),
            format_factors(&mix.mix.spec.left_factors),
            format_factors(&mix.mix.spec.right_factors)
        );
    }
    Ok(())
}

pub async fn default_mixes(backend: &Backend, song_id: &str) -> Result<()> {
    let editor = mix_editor(backend, song_id).await?;
    for mix in editor.selectable_mixes() {
        println!("{}", mix.name);
    }
    Ok(())
}

pub async fn create_mix(
    backend: &Backend,
    song_id: &str,
    standard: Option<String>,
    name: Option<String>,
    edits: &[String],
) -> Result<()> {
    let mut editor = mix_editor(backend, song_id).await?;
    if editor.parts().is_empty() {
        bail!("Song {} has no parts to mix", song_id);
    }

    match standard {
        Some(standard) => editor.select(&standard)?,
        None => {
            if let Some(name) = name {
                editor.set_custom_track_name(name);
            }
            for raw in edits {
                let edit = parse_edit(raw)?;
                editor.set_part_factor(edit.channel, &edit.part, edit.value)?;
            }
        }
    }

    let request = editor.to_request()?;
    let created = backend
        .song(song_id)
        .submit_mix(&request)
        .await
        .context("Failed to create mix")?;
    println!("{}", created.mix.name);
    Ok(())
}

pub async fn create_package(
    backend: &Backend,
    song_id: &str,
    selection: &[String],
    description: String,
    pitch: &str,
    speed: &str,
) -> Result<()> {
    let playback = playback_params(pitch, speed)?;
    let song = backend.song(song_id);

    let parts: Vec<String> = song
        .list_parts()
        .await
        .context("Failed to list parts")?
        .into_iter()
        .map(|p| p.part)
        .collect();
    let existing: Vec<String> = song
        .list_mixes()
        .await
        .context("Failed to list mixes")?
        .into_iter()
        .map(|m| m.mix.name)
        .collect();

    let mut planner = PackagePlanner::new(parts, existing);
    for id in selection {
        let known = planner
            .tree()
            .iter()
            .any(|n| &n.id == id || n.children.contains(id));
        if !known {
            bail!("Unknown mix '{}'", id);
        }
    }
    planner.select(selection);

    let request = planner.to_request(description, playback);
    if request.mixes.is_empty() {
        println!("All selected mixes already exist");
        return Ok(());
    }

    let created = song
        .create_mix_package(&request)
        .await
        .context("Failed to create mix package")?;
    for mix in created {
        println!("{}", mix.mix.name);
    }
    Ok(())
}

pub async fn delete_mix(backend: &Backend, song_id: &str, name: &str) -> Result<()> {
    backend
        .song(song_id)
        .delete_mix(name)
        .await
        .with_context(|| format!("Failed to delete mix {}", name))
}

// ========================================
// Zip
// ========================================

pub async fn zip(backend: &Backend, song_id: &str, output: Option<PathBuf>) -> Result<()> {
    let state = zip_song(&backend.song(song_id), output.as_deref())
        .await
        .context("Failed to zip song")?;

    match state {
        ZipState::Succeeded { download_url } => println!("{}", backend.url(&download_url)),
        ZipState::Failed => bail!(ZipState::Failed.description()),
        ZipState::Ready => {
            if let Some(path) = output {
                println!("{}", path.display());
            }
        }
        other => println!("{}", other.description()),
    }
    Ok(())
}
