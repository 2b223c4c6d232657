use crate::common::upload::UploadedFile;
use serde::Serialize;
use utoipa::ToSchema;

/// An upload whose parts are present and whose extensions are allow-listed.
#[derive(Debug)]
pub struct ValidatedUpload {
    pub image: UploadedFile,
    pub image_ext: String,
    pub audio: UploadedFile,
    pub audio_ext: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub upload_dir: String,
    pub encoder: String,
}
