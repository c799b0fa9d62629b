//! Zipped downloads of all of a song's tracks

use crate::song::SongClient;
use crate::Result;
use pmx_common::zip::{ZipAction, ZipState};
use std::path::Path;

/// Zip a song's tracks and optionally download the archive.
///
/// Drives a [`ZipState`] from `Ready` through the backend task. Returns the
/// state the task left it in: `Succeeded` (with the download URL) when no
/// destination was given, `Ready` after a completed download, or `Failed`.
pub async fn zip_song(song: &SongClient<'_>, dest: Option<&Path>) -> Result<ZipState> {
    let mut state = ZipState::Ready;
    if state.click() != ZipAction::Submit {
        return Ok(state);
    }

    let task_id = song.submit_zip_request().await?;
    state.submitted(task_id.as_str());

    let task = song.backend().wait_for_task(&task_id).await?;
    state.task_ended(&task);

    if state == ZipState::Failed {
        tracing::warn!(song_id = %song.song_id(), task_id = %task_id, "Zip task failed");
    }

    let succeeded = matches!(state, ZipState::Succeeded { .. });
    if let (true, Some(dest)) = (succeeded, dest) {
        if let ZipAction::Download(url) = state.click() {
            song.backend().download(&url, dest).await?;
        }
    }

    Ok(state)
}
