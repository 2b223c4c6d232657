pub const ALLOWED_IMAGE_EXT: &[&str] = &["png", "jpg", "jpeg"];
pub const ALLOWED_AUDIO_EXT: &[&str] = &["mp3", "wav", "m4a", "aac", "ogg"];

/// Lowercased text after the last `.`, or `None` when there is no `.` at all.
pub fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
}

pub fn is_allowed(filename: &str, allowed: &[&str]) -> bool {
    match extension(filename) {
        Some(ext) => allowed.contains(&ext.as_str()),
        None => false,
    }
}
