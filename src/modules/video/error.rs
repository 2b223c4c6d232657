use crate::common::upload::UploadError;
use crate::infrastructure::storage::local::StorageError;
use crate::workers::encoder::{EncodeError, truncate_chars};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("image or audio part missing")]
    MissingParts,

    #[error("empty filename")]
    MissingFiles,

    #[error("unsupported image format")]
    UnsupportedImage,

    #[error("unsupported audio format")]
    UnsupportedAudio,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("{0}")]
    Internal(String),
}

impl GenerateError {
    /// Text shown to the user on the upload page. Diagnostics coming from the
    /// encoder or the OS are cut to `limit` characters.
    pub fn user_message(&self, limit: usize) -> String {
        match self {
            GenerateError::Validation(ValidationError::MissingParts) => {
                "You must upload both an image and an audio file.".to_string()
            }
            GenerateError::Validation(ValidationError::MissingFiles) => "Missing files.".to_string(),
            GenerateError::Validation(ValidationError::UnsupportedImage) => {
                "Unsupported image format.".to_string()
            }
            GenerateError::Validation(ValidationError::UnsupportedAudio) => {
                "Unsupported audio format.".to_string()
            }
            GenerateError::Upload(e) => format!("Could not read the upload: {e}"),
            GenerateError::Storage(_) => "Error while saving the files.".to_string(),
            GenerateError::Encode(EncodeError::Failed { message, .. }) => format!(
                "Error while generating the video: {}",
                truncate_chars(message, limit)
            ),
            GenerateError::Encode(e) => format!("Internal error: {}", truncate_chars(&e.to_string(), limit)),
            GenerateError::Internal(e) => format!("Internal error: {}", truncate_chars(e, limit)),
        }
    }
}
