use super::dto::ValidatedUpload;
use super::error::{GenerateError, ValidationError};
use super::validator::{ALLOWED_AUDIO_EXT, ALLOWED_IMAGE_EXT, extension, is_allowed};
use crate::common::upload::UploadForm;
use crate::infrastructure::storage::local::{ArtifactSet, JobId, StorageError};
use crate::state::AppState;
use tracing::{error, info, warn};

pub struct VideoService;

impl VideoService {
    /// Presence is checked for both parts before any extension, so a request
    /// missing one part never touches the disk.
    pub fn validate(form: UploadForm) -> Result<ValidatedUpload, ValidationError> {
        let (image, audio) = match (form.image, form.audio) {
            (Some(image), Some(audio)) => (image, audio),
            _ => return Err(ValidationError::MissingParts),
        };

        if image.file_name.is_empty() || audio.file_name.is_empty() {
            return Err(ValidationError::MissingFiles);
        }

        if !is_allowed(&image.file_name, ALLOWED_IMAGE_EXT) {
            return Err(ValidationError::UnsupportedImage);
        }
        if !is_allowed(&audio.file_name, ALLOWED_AUDIO_EXT) {
            return Err(ValidationError::UnsupportedAudio);
        }

        let image_ext = extension(&image.file_name).ok_or(ValidationError::UnsupportedImage)?;
        let audio_ext = extension(&audio.file_name).ok_or(ValidationError::UnsupportedAudio)?;

        Ok(ValidatedUpload {
            image,
            image_ext,
            audio,
            audio_ext,
        })
    }

    /// Runs one job end to end and returns its artifacts, with deletion of all
    /// three files already scheduled.
    pub async fn generate(state: &AppState, form: UploadForm) -> Result<ArtifactSet, GenerateError> {
        let upload = Self::validate(form)?;

        let job_id = JobId::new();
        let artifacts = state
            .store
            .allocate_paths(job_id, &upload.image_ext, &upload.audio_ext);

        info!(
            "🎬 Job {}: {} ({} bytes) + {} ({} bytes)",
            job_id,
            upload.image.file_name,
            upload.image.data.len(),
            upload.audio.file_name,
            upload.audio.data.len()
        );

        if let Err(e) = Self::save_inputs(state, &upload, &artifacts).await {
            error!("❌ Job {}: {}", job_id, e);
            return Err(e.into());
        }

        if let Err(e) = state
            .encoder
            .encode(&artifacts.image, &artifacts.audio, &artifacts.output)
            .await
        {
            warn!("❌ Job {} failed to encode: {}", job_id, e);
            state
                .cleanup
                .schedule(artifacts.all(), state.config.failure_cleanup_delay());
            return Err(e.into());
        }

        state
            .cleanup
            .schedule(artifacts.all(), state.config.cleanup_delay());

        info!("✅ Job {} completed", job_id);
        Ok(artifacts)
    }

    /// Writes both inputs. If either write fails, both paths are handed to the
    /// failure cleanup so an input that did reach the disk is not orphaned.
    async fn save_inputs(
        state: &AppState,
        upload: &ValidatedUpload,
        artifacts: &ArtifactSet,
    ) -> Result<(), StorageError> {
        let saved = async {
            state.store.save(&upload.image.data, &artifacts.image).await?;
            state.store.save(&upload.audio.data, &artifacts.audio).await
        }
        .await;

        if saved.is_err() {
            state
                .cleanup
                .schedule(artifacts.inputs(), state.config.failure_cleanup_delay());
        }

        saved
    }
}
