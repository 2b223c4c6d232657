use std::env;
use std::str::FromStr;

pub enum EnvKey {
    ServerPort,
    UploadDir,
    FfmpegBin,
    EncodeTimeoutSecs,
    MaxConcurrentEncodes,
    CleanupDelaySecs,
    FailureCleanupDelaySecs,
    MaxUploadBytes,
    ErrorMessageLimit,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "PORT",
            EnvKey::UploadDir => "UPLOAD_DIR",
            EnvKey::FfmpegBin => "FFMPEG_BIN",
            EnvKey::EncodeTimeoutSecs => "ENCODE_TIMEOUT_SECS",
            EnvKey::MaxConcurrentEncodes => "MAX_CONCURRENT_ENCODES",
            EnvKey::CleanupDelaySecs => "CLEANUP_DELAY_SECS",
            EnvKey::FailureCleanupDelaySecs => "FAILURE_CLEANUP_DELAY_SECS",
            EnvKey::MaxUploadBytes => "MAX_UPLOAD_BYTES",
            EnvKey::ErrorMessageLimit => "ERROR_MESSAGE_LIMIT",
        }
    }
}

pub fn get(key: EnvKey) -> Result<String, env::VarError> {
    env::var(key.as_str())
}

pub fn get_or(key: EnvKey, default: &str) -> String {
    env::var(key.as_str()).unwrap_or_else(|_| default.to_string())
}

/// Reads and parses a variable, falling back to `default` when it is unset or
/// does not parse.
pub fn get_parsed<T: FromStr>(key: EnvKey, default: T) -> T {
    let name = key.as_str();
    match get(key) {
        Ok(val) => match val.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!("Invalid value '{}' for {}, using default", val, name);
                default
            }
        },
        Err(_) => default,
    }
}
