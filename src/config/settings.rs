use crate::config::env::{self, EnvKey};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub upload_dir: PathBuf,
    pub ffmpeg_bin: String,
    pub encode_timeout_secs: u64,
    pub max_concurrent_encodes: usize,
    pub cleanup_delay_secs: u64,
    pub failure_cleanup_delay_secs: u64,
    pub max_upload_bytes: usize,
    pub error_message_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8080,
            upload_dir: PathBuf::from("uploads"),
            ffmpeg_bin: "ffmpeg".to_string(),
            encode_timeout_secs: 600,
            max_concurrent_encodes: 2,
            cleanup_delay_secs: 300,
            failure_cleanup_delay_secs: 10,
            max_upload_bytes: 256 * 1024 * 1024,
            error_message_limit: 400,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env::get_parsed(EnvKey::ServerPort, defaults.server_port),
            upload_dir: env::get(EnvKey::UploadDir)
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            ffmpeg_bin: env::get_or(EnvKey::FfmpegBin, &defaults.ffmpeg_bin),
            encode_timeout_secs: env::get_parsed(EnvKey::EncodeTimeoutSecs, defaults.encode_timeout_secs),
            // A zero-permit semaphore would stall every request.
            max_concurrent_encodes: env::get_parsed(EnvKey::MaxConcurrentEncodes, defaults.max_concurrent_encodes).max(1),
            cleanup_delay_secs: env::get_parsed(EnvKey::CleanupDelaySecs, defaults.cleanup_delay_secs),
            failure_cleanup_delay_secs: env::get_parsed(
                EnvKey::FailureCleanupDelaySecs,
                defaults.failure_cleanup_delay_secs,
            ),
            max_upload_bytes: env::get_parsed(EnvKey::MaxUploadBytes, defaults.max_upload_bytes),
            error_message_limit: env::get_parsed(EnvKey::ErrorMessageLimit, defaults.error_message_limit),
        }
    }

    pub fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.encode_timeout_secs)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.cleanup_delay_secs)
    }

    pub fn failure_cleanup_delay(&self) -> Duration {
        Duration::from_secs(self.failure_cleanup_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        let config = AppConfig::new();
        let defaults = AppConfig::default();

        if std::env::var("UPLOAD_DIR").is_err() {
            assert_eq!(config.upload_dir, defaults.upload_dir);
        }
        if std::env::var("FFMPEG_BIN").is_err() {
            assert_eq!(config.ffmpeg_bin, defaults.ffmpeg_bin);
        }
        assert!(config.max_concurrent_encodes >= 1);
    }

    #[test]
    fn delays_are_whole_seconds() {
        let config = AppConfig::default();

        assert_eq!(config.cleanup_delay(), Duration::from_secs(300));
        assert_eq!(config.failure_cleanup_delay(), Duration::from_secs(10));
        assert_eq!(config.encode_timeout(), Duration::from_secs(600));
    }
}
