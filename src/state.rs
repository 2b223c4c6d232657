use crate::config::settings::AppConfig;
use crate::infrastructure::storage::local::TempFileStore;
use crate::workers::cleanup::CleanupScheduler;
use crate::workers::encoder::EncodeInvoker;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: TempFileStore,
    pub cleanup: CleanupScheduler,
    pub encoder: EncodeInvoker,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let store = TempFileStore::new(config.upload_dir.clone());
        let cleanup = CleanupScheduler::new(store.clone());
        let encoder = EncodeInvoker::new(
            config.ffmpeg_bin.clone(),
            config.encode_timeout(),
            config.max_concurrent_encodes,
            config.error_message_limit,
        );

        Self {
            config,
            store,
            cleanup,
            encoder,
        }
    }
}
