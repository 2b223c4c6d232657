use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("{message}")]
    Failed {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("could not run {bin}: {message}")]
    Launch { bin: String, message: String },

    #[error("encoder timed out after {0}s")]
    TimedOut(u64),
}

/// Runs the external encoder that turns a still image and an audio track into an MP4.
#[derive(Clone, Debug)]
pub struct EncodeInvoker {
    bin: String,
    timeout: Duration,
    message_limit: usize,
    permits: Arc<Semaphore>,
}

impl EncodeInvoker {
    pub fn new(bin: impl Into<String>, timeout: Duration, max_concurrent: usize, message_limit: usize) -> Self {
        Self {
            bin: bin.into(),
            timeout,
            message_limit,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    pub async fn encode(&self, image: &Path, audio: &Path, output: &Path) -> Result<(), EncodeError> {
        // Waits here while the configured number of encodes are already running.
        let _permit = self.permits.acquire().await.map_err(|e| EncodeError::Launch {
            bin: self.bin.clone(),
            message: e.to_string(),
        })?;

        let args = encode_args(image, audio, output);
        debug!(
            "Running encoder: {} {}",
            self.bin,
            args.iter().map(|a| a.to_string_lossy()).collect::<Vec<_>>().join(" ")
        );

        let mut command = Command::new(&self.bin);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the pending output future on timeout kills the child.
        let result = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result,
            Err(_) => {
                warn!("Encoder timed out after {:?}, process killed", self.timeout);
                return Err(EncodeError::TimedOut(self.timeout.as_secs()));
            }
        };

        let result = result.map_err(|e| {
            error!("❌ Failed to launch {}: {}", self.bin, e);
            EncodeError::Launch {
                bin: self.bin.clone(),
                message: e.to_string(),
            }
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stdout = String::from_utf8_lossy(&result.stdout);
            let diagnostic = if stderr.trim().is_empty() { stdout } else { stderr };

            warn!("Encoder exited with {}", result.status);
            return Err(EncodeError::Failed {
                message: truncate_chars(diagnostic.trim(), self.message_limit),
                exit_code: result.status.code(),
            });
        }

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => {
                info!("✅ Encoded {} ({} bytes)", output.display(), meta.len());
                Ok(())
            }
            _ => Err(EncodeError::Failed {
                message: format!("{} exited successfully but wrote no output", self.bin),
                exit_code: result.status.code(),
            }),
        }
    }
}

const INPUT_OPTIONS: [&str; 5] = ["-y", "-loop", "1", "-framerate", "2"];

const OUTPUT_OPTIONS: [&str; 15] = [
    "-c:v", "libx264",
    "-preset", "veryfast",
    "-crf", "23",
    "-c:a", "aac",
    "-b:a", "192k",
    "-shortest",
    "-pix_fmt", "yuv420p",
    "-vf", "scale=trunc(iw/2)*2:trunc(ih/2)*2",
];

/// The fixed encoder argument list: loop the still image at 2 fps, mux it with the
/// audio, and stop at the shorter input. Dimensions are forced even for yuv420p.
pub fn encode_args(image: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = INPUT_OPTIONS.iter().map(OsString::from).collect();

    args.push("-i".into());
    args.push(image.as_os_str().to_owned());
    args.push("-i".into());
    args.push(audio.as_os_str().to_owned());
    args.extend(OUTPUT_OPTIONS.iter().map(OsString::from));
    args.push(output.as_os_str().to_owned());

    args
}

/// Keeps at most `limit` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn argument_list_is_fixed() {
        let args = encode_args(Path::new("in.png"), Path::new("in.mp3"), Path::new("out.mp4"));

        assert_eq!(
            strings(&args),
            vec![
                "-y", "-loop", "1", "-framerate", "2", "-i", "in.png", "-i", "in.mp3",
                "-c:v", "libx264", "-preset", "veryfast", "-crf", "23",
                "-c:a", "aac", "-b:a", "192k", "-shortest", "-pix_fmt", "yuv420p",
                "-vf", "scale=trunc(iw/2)*2:trunc(ih/2)*2", "out.mp4",
            ]
        );
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("àèìòù", 3), "àèì");
        assert_eq!(truncate_chars("short", 400), "short");
        assert_eq!(truncate_chars(&"x".repeat(1000), 400).len(), 400);
    }

    #[test]
    fn timeout_message_uses_seconds_suffix() {
        assert_eq!(EncodeError::TimedOut(1).to_string(), "encoder timed out after 1s");
        assert_eq!(EncodeError::TimedOut(600).to_string(), "encoder timed out after 600s");
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let invoker = EncodeInvoker::new(
            "stillcast-no-such-encoder",
            Duration::from_secs(5),
            1,
            400,
        );

        let err = invoker
            .encode(
                &dir.path().join("a.png"),
                &dir.path().join("a.mp3"),
                &dir.path().join("a.mp4"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EncodeError::Launch { .. }), "{err:?}");
        assert!(err.to_string().contains("stillcast-no-such-encoder"));
    }

    fn ffmpeg_available() -> bool {
        std::process::Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn lavfi(args: &[&str], out: &Path) {
        let status = std::process::Command::new("ffmpeg")
            .args(["-y", "-v", "error", "-f", "lavfi"])
            .args(args)
            .arg(out)
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn corrupt_image_fails_with_diagnostic() {
        if !ffmpeg_available() {
            eprintln!("ffmpeg not on PATH, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("bad_img.png");
        let audio = dir.path().join("ok_aud.wav");
        std::fs::write(&image, b"definitely not a png").unwrap();
        lavfi(&["-i", "anullsrc=r=44100:cl=mono", "-t", "1"], &audio);

        let invoker = EncodeInvoker::new("ffmpeg", Duration::from_secs(60), 1, 400);
        let err = invoker
            .encode(&image, &audio, &dir.path().join("bad_out.mp4"))
            .await
            .unwrap_err();

        match err {
            EncodeError::Failed { message, exit_code } => {
                assert!(!message.is_empty());
                assert!(message.chars().count() <= 400);
                assert_ne!(exit_code, Some(0));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn tiny_inputs_produce_a_video_with_audio() {
        if !ffmpeg_available() {
            eprintln!("ffmpeg not on PATH, skipping");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("t_img.png");
        let audio = dir.path().join("t_aud.wav");
        let output = dir.path().join("t_out.mp4");
        lavfi(&["-i", "color=c=red:s=2x2", "-frames:v", "1"], &image);
        lavfi(&["-i", "anullsrc=r=44100:cl=mono", "-t", "1"], &audio);

        let invoker = EncodeInvoker::new("ffmpeg", Duration::from_secs(120), 1, 400);
        invoker.encode(&image, &audio, &output).await.unwrap();

        assert!(std::fs::metadata(&output).unwrap().len() > 0);

        let probe = std::process::Command::new("ffprobe")
            .args(["-v", "error", "-show_entries", "stream=codec_type", "-of", "csv=p=0"])
            .arg(&output)
            .output();
        if let Ok(probe) = probe {
            let streams = String::from_utf8_lossy(&probe.stdout);
            assert!(streams.contains("video"), "{streams}");
            assert!(streams.contains("audio"), "{streams}");
        }
    }
}
