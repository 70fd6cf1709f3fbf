use super::{AudioToolkit, AudioToolkitError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;

/// `ffmpeg`/`ffprobe` implementation of the audio toolkit.
///
/// Every operation works inside a scoped temporary directory that is removed
/// when the call returns, success or failure. Subprocess invocations are
/// awaited to process exit.
pub struct FfmpegAudioToolkit {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegAudioToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegAudioToolkit {
    /// Resolve both binaries from `PATH`.
    pub fn new() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }

    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    async fn run(&self, tool: &Path, args: &[String]) -> Result<Output, AudioToolkitError> {
        let output = Command::new(tool)
            .args(args)
            .output()
            .await
            .map_err(|source| AudioToolkitError::Spawn {
                tool: tool.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(AudioToolkitError::Failed {
                tool: tool.display().to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    async fn run_ffmpeg(&self, args: &[String]) -> Result<(), AudioToolkitError> {
        self.run(&self.ffmpeg, args).await.map(|_| ())
    }
}

/// Parse `ffprobe` duration output (seconds) into integer milliseconds.
fn parse_probe_millis(stdout: &str) -> Result<u64, AudioToolkitError> {
    let trimmed = stdout.trim();
    let seconds: f64 = trimmed
        .parse()
        .map_err(|_| AudioToolkitError::UnparsableOutput {
            tool: "ffprobe".to_string(),
            output: trimmed.to_string(),
        })?;
    Ok((seconds * 1000.0).round() as u64)
}

fn seconds_arg(ms: u64) -> String {
    format!("{:.3}", ms as f64 / 1000.0)
}

#[async_trait]
impl AudioToolkit for FfmpegAudioToolkit {
    async fn concat(&self, segments: &[Vec<u8>]) -> Result<Vec<u8>, AudioToolkitError> {
        let workdir = TempDir::new()?;

        let mut list = String::new();
        for (index, segment) in segments.iter().enumerate() {
            let name = format!("seg_{index:04}.mp3");
            tokio::fs::write(workdir.path().join(&name), segment).await?;
            list.push_str(&format!("file '{name}'\n"));
        }
        let list_path = workdir.path().join("concat.txt");
        tokio::fs::write(&list_path, list).await?;

        let out_path = workdir.path().join("combined.mp3");
        let args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list_path.display().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            out_path.display().to_string(),
        ];
        self.run_ffmpeg(&args).await?;

        let combined = tokio::fs::read(&out_path).await?;
        tracing::debug!(
            segment_count = segments.len(),
            combined_size_bytes = combined.len(),
            "Segments concatenated"
        );
        Ok(combined)
    }

    async fn duration_ms(&self, audio: &[u8]) -> Result<u64, AudioToolkitError> {
        let workdir = TempDir::new()?;
        let in_path = workdir.path().join("probe.mp3");
        tokio::fs::write(&in_path, audio).await?;

        let args = vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            in_path.display().to_string(),
        ];
        let output = self.run(&self.ffprobe, &args).await?;
        parse_probe_millis(&String::from_utf8_lossy(&output.stdout))
    }

    async fn slice(
        &self,
        audio: &[u8],
        start_ms: u64,
        end_ms: Option<u64>,
    ) -> Result<Vec<u8>, AudioToolkitError> {
        let workdir = TempDir::new()?;
        let in_path = workdir.path().join("in.mp3");
        let out_path = workdir.path().join("out.mp3");
        tokio::fs::write(&in_path, audio).await?;

        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            in_path.display().to_string(),
            "-ss".to_string(),
            seconds_arg(start_ms),
        ];
        if let Some(end_ms) = end_ms {
            args.push("-to".to_string());
            args.push(seconds_arg(end_ms));
        }
        // Re-encode rather than stream-copy: copy snaps to frame boundaries
        // and drifts the cut by up to a frame.
        args.extend([
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-q:a".to_string(),
            "4".to_string(),
            out_path.display().to_string(),
        ]);
        self.run_ffmpeg(&args).await?;

        Ok(tokio::fs::read(&out_path).await?)
    }

    async fn generate_silence(&self, seconds: f32) -> Result<Vec<u8>, AudioToolkitError> {
        let workdir = TempDir::new()?;
        let out_path = workdir.path().join("silence.mp3");

        let args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            "anullsrc=r=24000:cl=mono".to_string(),
            "-t".to_string(),
            format!("{seconds:.3}"),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-q:a".to_string(),
            "9".to_string(),
            out_path.display().to_string(),
        ];
        self.run_ffmpeg(&args).await?;

        Ok(tokio::fs::read(&out_path).await?)
    }

    async fn trim_trailing_silence(&self, audio: &[u8]) -> Result<Vec<u8>, AudioToolkitError> {
        let workdir = TempDir::new()?;
        let in_path = workdir.path().join("in.mp3");
        let out_path = workdir.path().join("out.mp3");
        tokio::fs::write(&in_path, audio).await?;

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            in_path.display().to_string(),
            "-af".to_string(),
            "areverse,silenceremove=start_periods=1:start_silence=0.05:start_threshold=-50dB,areverse"
                .to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-q:a".to_string(),
            "4".to_string(),
            out_path.display().to_string(),
        ];
        self.run_ffmpeg(&args).await?;

        Ok(tokio::fs::read(&out_path).await?)
    }
}
