//! Audio download utilities.
//!
//! Thin wrappers around yt-dlp and ffprobe for fetching a video's audio
//! track and checking its duration.

use crate::error::{Result, SvarError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Downloads the audio track of a video and saves it as MP3.
///
/// Uses yt-dlp with its ffmpeg post-processor. If the file already exists
/// in `output_dir`, it is reused without re-downloading.
#[instrument(skip(output_dir), fields(media_id = %media_id))]
pub async fn download_audio(url: &str, media_id: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target_path = output_dir.join(format!("{}.mp3", media_id));

    if target_path.exists() {
        info!("Using cached audio file");
        return Ok(target_path);
    }

    info!("Downloading audio from {}", url);

    let template = output_dir.join(format!("{}.%(ext)s", media_id));

    let result = Command::new("yt-dlp")
        .arg("--extract-audio")
        .arg("--audio-format").arg("mp3")
        .arg("--output").arg(template.to_str().unwrap_or_default())
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(SvarError::AudioDownload(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SvarError::AudioDownload(format!("yt-dlp failed: {stderr}")));
    }

    if !target_path.exists() {
        return Err(SvarError::AudioDownload(
            "Audio file not found after download".into(),
        ));
    }

    Ok(target_path)
}

/// Fetches the title of a video without downloading it.
#[instrument]
pub async fn fetch_title(url: &str) -> Result<String> {
    let result = Command::new("yt-dlp")
        .arg("--print").arg("%(title)s")
        .arg("--skip-download")
        .arg("--no-playlist")
        .arg("--no-warnings")
        .arg(url)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(SvarError::AudioDownload(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SvarError::ToolFailed(format!("yt-dlp metadata fetch failed: {stderr}")));
    }

    let title = String::from_utf8_lossy(&output.stdout).trim().to_string();
    debug!("Fetched title: {}", title);

    if title.is_empty() {
        Ok("Unknown".to_string())
    } else {
        Ok(title)
    }
}

/// Queries the duration of an audio file in seconds using ffprobe.
#[instrument]
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(SvarError::AudioDownload(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(SvarError::ToolFailed("ffprobe returned error".into()));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| SvarError::AudioDownload("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| SvarError::AudioDownload("Could not determine audio duration".into()))
}
