use axum::{
    body::Bytes,
    extract::{
        Multipart,
        multipart::{Field, MultipartError},
    },
};
use futures_util::StreamExt;
use thiserror::Error;
use tracing::{debug, warn};

pub const IMAGE_FIELD: &str = "image";
pub const AUDIO_FIELD: &str = "audio";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("upload exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
}

/// A file part held in memory until the whole form has been validated.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// The two file parts of a generate request. Either may be absent.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<UploadedFile>,
    pub audio: Option<UploadedFile>,
}

/// Drains the multipart body, keeping the `image` and `audio` parts and
/// skipping everything else. `limit` bounds the combined size of the kept parts.
pub async fn read_upload_form(mut multipart: Multipart, limit: usize) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();
    let mut total = 0usize;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        let slot = match name.as_str() {
            IMAGE_FIELD => &mut form.image,
            AUDIO_FIELD => &mut form.audio,
            other => {
                debug!("Ignoring multipart field '{}'", other);
                continue;
            }
        };

        let file_name = field.file_name().unwrap_or("").to_string();
        let data = collect_field(field, &mut total, limit).await?;

        debug!("Received '{}' part: {} ({} bytes)", name, file_name, data.len());
        *slot = Some(UploadedFile { file_name, data });
    }

    Ok(form)
}

async fn collect_field(mut field: Field<'_>, total: &mut usize, limit: usize) -> Result<Bytes, UploadError> {
    let mut buffer = Vec::new();

    while let Some(chunk) = field.next().await {
        let chunk = match chunk {
            Ok(c) => c,
            Err(e) => {
                warn!("Stream error: {}", e);
                return Err(UploadError::Multipart(e));
            }
        };

        *total += chunk.len();
        if *total > limit {
            return Err(UploadError::TooLarge { limit });
        }

        buffer.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(buffer))
}
